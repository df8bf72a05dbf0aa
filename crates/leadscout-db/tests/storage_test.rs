use leadscout_core::{Coordinates, GeoVerdict, Lead, LeadDraft, SourceId};
use leadscout_db::{leads, runs, Database, LeadSink};
use serde_json::json;

fn lead(n: u32, phone: &str) -> Lead {
    Lead::new(
        LeadDraft {
            external_id: format!("fotocasa-{n}"),
            title: format!("Piso {n}"),
            price: Some(150_000),
            phone: phone.to_string(),
            address: "Sants, Barcelona".to_string(),
            source: SourceId::Fotocasa,
        },
        GeoVerdict::Within {
            coordinates: Coordinates::new(41.375, 2.135),
            distance_km: 3.4,
        },
    )
    .expect("valid lead")
}

#[tokio::test]
async fn test_leads_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("leads.db");

    let db = Database::open_migrated(&path).await.expect("open db");
    let processed = db
        .lead_sink()
        .upsert(&[lead(1, "611111111"), lead(2, "622222222")])
        .await;
    assert_eq!(processed, 2);
    db.close().await;

    let db = Database::open_migrated(&path).await.expect("reopen db");
    assert_eq!(
        leads::count_leads(db.pool(), Some(SourceId::Fotocasa))
            .await
            .expect("count"),
        2
    );

    // A second crawl finding the same phone adds nothing.
    db.lead_sink().upsert(&[lead(3, "611111111")]).await;
    assert_eq!(leads::count_leads(db.pool(), None).await.expect("count"), 2);
    db.close().await;
}

#[tokio::test]
async fn test_run_journal() {
    let db = Database::open_migrated(":memory:").await.expect("open db");

    let run = db.create_run().await.expect("create run");
    db.finish_run(&run.id, 2, 2, &json!({"fotocasa": 2}))
        .await
        .expect("finish run");

    let runs = runs::recent_runs(db.pool(), 5).await.expect("runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, run.id);
    assert_eq!(runs[0].summary["fotocasa"], 2);
}
