//! Style deduplication pool

use ahash::AHashMap;

use super::Style;

/// Deduplicating style table
///
/// Index 0 is always the default style, so a zeroed style index on a cell
/// means "unstyled". Identical styles registered repeatedly share one slot.
#[derive(Debug, Clone)]
pub struct StylePool {
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
}

impl StylePool {
    /// Create a pool holding only the default style
    pub fn new() -> Self {
        let default = Style::default();
        let mut index_map = AHashMap::new();
        index_map.insert(default.clone(), 0);
        Self {
            styles: vec![default],
            index_map,
        }
    }

    /// Register a style, returning its index; existing styles are reused
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.index_map.insert(style, idx);
        idx
    }

    /// Look up a style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of styles in the pool (at least 1)
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Always false: the default style is ever-present
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate styles in index order
    pub fn iter(&self) -> impl Iterator<Item = &Style> {
        self.styles.iter()
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn index_zero_is_default() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0), Some(&Style::default()));
    }

    #[test]
    fn identical_styles_share_an_index() {
        let mut pool = StylePool::new();
        let a = pool.get_or_insert(Style::new().bold());
        let b = pool.get_or_insert(Style::new().bold());
        assert_eq!(a, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn default_style_reuses_index_zero() {
        let mut pool = StylePool::new();
        assert_eq!(pool.get_or_insert(Style::default()), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_styles_get_distinct_indices() {
        let mut pool = StylePool::new();
        let bold = pool.get_or_insert(Style::new().bold());
        let red = pool.get_or_insert(Style::new().font_color(Color::rgb(255, 0, 0)));
        assert_ne!(bold, red);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(bold), Some(&Style::new().bold()));
    }
}
