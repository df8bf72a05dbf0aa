//! JavaScript snippets evaluated in the page to resolve [`Locator`]s.
//!
//! Every snippet returns a non-null value (`""`, `false` or `[]` when nothing
//! matched) so results always deserialize.

use crate::error::{BrowserError, Result};
use crate::locator::Locator;

const PRELUDE: &str = r"
const visible = (el) => {
  const r = el.getBoundingClientRect();
  const s = window.getComputedStyle(el);
  return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';
};
const textOf = (el) => (el.innerText || el.textContent || '').trim();
const matching = (onlyVisible) => {
  const out = [];
  for (const loc of LOCATORS) {
    let nodes = [];
    try { nodes = Array.from(document.querySelectorAll(loc.css)); } catch (e) { continue; }
    for (const el of nodes) {
      if (loc.text && !textOf(el).toLowerCase().includes(loc.text.toLowerCase())) continue;
      if (onlyVisible && !visible(el)) continue;
      out.push(el);
    }
  }
  return out;
};
";

fn wrap(locators: &[Locator], body: &str) -> Result<String> {
    let json = serde_json::to_string(locators).map_err(|e| BrowserError::ScriptError(e.to_string()))?;
    Ok(format!(
        "(() => {{\nconst LOCATORS = {json};\n{PRELUDE}\n{body}\n}})()"
    ))
}

/// Trimmed text of the first element matching any locator, or `""`.
pub fn first_text(locators: &[Locator]) -> Result<String> {
    wrap(
        locators,
        "const el = matching(false)[0]; return el ? textOf(el) : '';",
    )
}

/// Trimmed text of the first visible element matching any locator, or `""`.
pub fn first_visible_text(locators: &[Locator]) -> Result<String> {
    wrap(
        locators,
        "for (const el of matching(true)) { const t = textOf(el); if (t) return t; } return '';",
    )
}

/// Outer HTML of every element matching the first locator that matches anything.
pub fn outer_html_all(locators: &[Locator]) -> Result<String> {
    wrap(
        locators,
        r"for (const loc of LOCATORS) {
  let nodes = [];
  try { nodes = Array.from(document.querySelectorAll(loc.css)); } catch (e) { continue; }
  nodes = nodes.filter((el) => !loc.text || textOf(el).toLowerCase().includes(loc.text.toLowerCase()));
  if (nodes.length > 0) return nodes.map((el) => el.outerHTML);
}
return [];",
    )
}

/// Click the first visible element matching any locator; `true` when clicked.
pub fn click_first_visible(locators: &[Locator]) -> Result<String> {
    wrap(
        locators,
        "const el = matching(true)[0]; if (!el) return false; el.scrollIntoView({block: 'center'}); el.click(); return true;",
    )
}

/// Whether any locator currently matches a visible element.
pub fn any_visible(locators: &[Locator]) -> Result<String> {
    wrap(locators, "return matching(true).length > 0;")
}

pub const BODY_TEXT: &str = "(() => (document.body ? document.body.innerText || '' : ''))()";

pub const SCROLL_HEIGHT: &str =
    "(() => Math.max(document.body ? document.body.scrollHeight : 0, document.documentElement.scrollHeight))()";

pub fn scroll_by(step_px: u32) -> String {
    format!("(() => {{ window.scrollBy(0, {step_px}); return window.scrollY + window.innerHeight; }})()")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locators_are_embedded_as_json() {
        let script = first_text(&[Locator::with_text("button", "Ver \"teléfono\"")]).unwrap();
        assert!(script.contains(r#"const LOCATORS = [{"css":"button","text":"Ver \"teléfono\""}];"#));
        assert!(script.starts_with("(() => {"));
        assert!(script.ends_with("})()"));
    }

    #[test]
    fn test_empty_results_are_not_null() {
        let locators = [Locator::css("a.next")];
        assert!(first_text(&locators).unwrap().contains("return el ? textOf(el) : '';"));
        assert!(click_first_visible(&locators).unwrap().contains("return false;"));
        assert!(outer_html_all(&locators).unwrap().contains("return [];"));
    }

    #[test]
    fn test_scroll_by() {
        assert!(scroll_by(300).contains("window.scrollBy(0, 300)"));
    }
}
