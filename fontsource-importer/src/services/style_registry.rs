//! Installed style blocks
//!
//! Stands in for the host's `<style>` elements: one block per active font
//! (`fontsource-{id}`) and one for the CSS variables
//! (`fontsource-css-variables`). All operations are idempotent.

pub const CSS_VARIABLES_ELEMENT_ID: &str = "fontsource-css-variables";

pub fn font_element_id(id: &str) -> String {
    format!("fontsource-{}", id)
}

#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    /// Insertion order is kept so the rendered sheet is stable
    elements: Vec<(String, String)>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the block `element_id`
    pub fn upsert(&mut self, element_id: &str, css: String) {
        match self.elements.iter_mut().find(|(id, _)| id == element_id) {
            Some((_, existing)) => *existing = css,
            None => self.elements.push((element_id.to_string(), css)),
        }
    }

    /// Remove `element_id`, returning whether it was present
    pub fn remove(&mut self, element_id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|(id, _)| id != element_id);
        self.elements.len() != before
    }

    pub fn get(&self, element_id: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|(id, _)| id == element_id)
            .map(|(_, css)| css.as_str())
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.get(element_id).is_some()
    }

    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All blocks as one stylesheet, each headed by its element id
    pub fn render(&self) -> String {
        let mut css = String::new();
        for (id, block) in &self.elements {
            css.push_str(&format!("/* {} */\n", id));
            css.push_str(block);
            if !block.ends_with('\n') {
                css.push('\n');
            }
        }
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut styles = StyleRegistry::new();
        styles.upsert(&font_element_id("inter"), "a".to_string());
        styles.upsert(CSS_VARIABLES_ELEMENT_ID, "vars".to_string());
        styles.upsert(&font_element_id("inter"), "b".to_string());

        assert_eq!(styles.len(), 2);
        assert_eq!(styles.get("fontsource-inter"), Some("b"));
        let ids: Vec<_> = styles.element_ids().collect();
        assert_eq!(ids, vec!["fontsource-inter", "fontsource-css-variables"]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut styles = StyleRegistry::new();
        styles.upsert("fontsource-inter", "a".to_string());
        assert!(styles.remove("fontsource-inter"));
        assert!(!styles.remove("fontsource-inter"));
        assert!(styles.is_empty());
    }

    #[test]
    fn test_render() {
        let mut styles = StyleRegistry::new();
        styles.upsert("fontsource-inter", "x {}".to_string());
        assert_eq!(styles.render(), "/* fontsource-inter */\nx {}\n");
    }
}
