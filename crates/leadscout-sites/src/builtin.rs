//! Site definitions compiled into the binary.

use crate::definition::SiteDefinition;
use crate::error::{Result, SiteError};

const BUILTIN: [(&str, &str); 4] = [
    (
        "idealista.toml",
        include_str!("../../../site-definitions/idealista.toml"),
    ),
    (
        "fotocasa.toml",
        include_str!("../../../site-definitions/fotocasa.toml"),
    ),
    (
        "milanuncios.toml",
        include_str!("../../../site-definitions/milanuncios.toml"),
    ),
    (
        "habitaclia.toml",
        include_str!("../../../site-definitions/habitaclia.toml"),
    ),
];

/// Parse and validate every built-in definition.
pub fn definitions() -> Result<Vec<SiteDefinition>> {
    BUILTIN
        .iter()
        .map(|(name, contents)| {
            let definition: SiteDefinition =
                toml::from_str(contents).map_err(|e| SiteError::ParseError {
                    path: format!("builtin:{name}"),
                    source: e,
                })?;
            definition.validate()?;
            Ok(definition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscout_core::SourceId;

    #[test]
    fn test_builtin_definitions_are_valid() {
        let defs = definitions().expect("builtin definitions");
        let ids: Vec<_> = defs.iter().map(SiteDefinition::id).collect();
        assert_eq!(
            ids,
            vec![
                SourceId::Idealista,
                SourceId::Fotocasa,
                SourceId::Milanuncios,
                SourceId::Habitaclia
            ]
        );
        for def in &defs {
            assert_eq!(def.categories.len(), 2, "{}", def.name());
            assert!(!def.detail.phone_value.is_empty(), "{}", def.name());
        }
    }

    #[test]
    fn test_builtin_screening() {
        let defs = definitions().expect("builtin definitions");
        let by_id = |id| defs.iter().find(|d| d.id() == id).expect("definition");

        assert!(by_id(SourceId::Idealista).screening.is_challenge("Captcha"));
        assert!(!by_id(SourceId::Milanuncios).screening.accepts("Inmobiliaria Sol"));
        assert!(!by_id(SourceId::Habitaclia).screening.accepts("Piso luminoso"));
        assert!(by_id(SourceId::Habitaclia).screening.accepts("Vende particular"));
        assert!(by_id(SourceId::Milanuncios).detail.scan_description_for_phone);
    }
}
