//! Paged gallery state
//!
//! Tracks the items loaded so far for one category, the next page to request,
//! and whether the backend has more to give. Pages are merged by item id so a
//! page that overlaps what is already loaded never produces duplicates.

use std::collections::HashSet;

use crate::types::{Category, ClothItem};

/// Items requested per page
pub const DEFAULT_PAGE_LIMIT: u32 = 3;

#[derive(Debug, Clone)]
pub struct GalleryPager {
    category: Category,
    limit: u32,
    page: u32,
    items: Vec<ClothItem>,
    has_more: bool,
    loading: bool,
}

impl GalleryPager {
    pub fn new(category: Category, limit: u32) -> Self {
        Self {
            category,
            limit: limit.max(1),
            page: 0,
            items: Vec::new(),
            has_more: true,
            loading: false,
        }
    }

    pub const fn category(&self) -> Category {
        self.category
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[ClothItem] {
        &self.items
    }

    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Offset of the page that should be fetched next
    pub const fn next_offset(&self) -> u32 {
        self.page * self.limit
    }

    /// Switch category and start over from the first page
    pub fn select_category(&mut self, category: Category) {
        self.category = category;
        self.page = 0;
        self.items.clear();
        self.has_more = true;
        self.loading = false;
    }

    /// Mark a fetch as in flight
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Advance to the next page. Returns the offset to fetch, or `None` when
    /// a load is already running or the end has been reached.
    pub fn request_next_page(&mut self) -> Option<u32> {
        if self.loading || !self.has_more {
            return None;
        }
        self.page += 1;
        self.loading = true;
        Some(self.next_offset())
    }

    /// Replace everything with the first page of the current category
    pub fn apply_first_page(&mut self, items: Vec<ClothItem>) {
        self.has_more = !items.is_empty();
        self.items = items;
        self.page = 0;
        self.loading = false;
    }

    /// Merge a follow-up page; an empty page means the end was reached
    pub fn apply_page(&mut self, items: Vec<ClothItem>) {
        self.loading = false;
        if items.is_empty() {
            self.has_more = false;
            return;
        }

        let mut seen: HashSet<i64> = self.items.iter().map(|item| item.id).collect();
        self.items
            .extend(items.into_iter().filter(|item| seen.insert(item.id)));
    }

    /// Reflect a saved item. Returns `true` if the local list changed.
    ///
    /// An item whose category changed is dropped unless the gallery shows
    /// every category; items not loaded here are ignored.
    pub fn apply_saved(&mut self, saved: ClothItem) -> bool {
        let Some(index) = self.items.iter().position(|item| item.id == saved.id) else {
            return false;
        };

        if self.items[index].category != saved.category && self.category != Category::All {
            self.items.remove(index);
        } else {
            self.items[index] = saved;
        }
        true
    }

    /// Drop a deleted item. Returns `true` if it was loaded.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }
}

impl Default for GalleryPager {
    fn default() -> Self {
        Self::new(Category::All, DEFAULT_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, category: &str) -> ClothItem {
        ClothItem {
            id,
            name: format!("item-{id}"),
            cloth_type: category.to_string(),
            colour: "black".to_string(),
            image_url: format!("https://img.example/{id}.png"),
            category: category.to_string(),
            styles: vec![],
        }
    }

    fn ids(pager: &GalleryPager) -> Vec<i64> {
        pager.items().iter().map(|item| item.id).collect()
    }

    #[test]
    fn test_offsets_follow_pages() {
        let mut pager = GalleryPager::default();
        assert_eq!(pager.next_offset(), 0);

        pager.apply_first_page(vec![item(1, "top"), item(2, "top"), item(3, "top")]);
        assert_eq!(pager.request_next_page(), Some(3));
        // loading, so a second trigger is ignored
        assert_eq!(pager.request_next_page(), None);

        pager.apply_page(vec![item(4, "top")]);
        assert_eq!(pager.request_next_page(), Some(6));
    }

    #[test]
    fn test_merge_skips_known_ids() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top"), item(2, "top"), item(3, "top")]);
        pager.request_next_page();
        pager.apply_page(vec![item(3, "top"), item(4, "top"), item(4, "top")]);

        assert_eq!(ids(&pager), vec![1, 2, 3, 4]);
        assert!(pager.has_more());
    }

    #[test]
    fn test_empty_page_ends_paging() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top")]);
        pager.request_next_page();
        pager.apply_page(vec![]);

        assert!(!pager.has_more());
        assert_eq!(pager.request_next_page(), None);
        assert_eq!(ids(&pager), vec![1]);
    }

    #[test]
    fn test_empty_first_page_has_no_more() {
        let mut pager = GalleryPager::new(Category::Shoes, 3);
        pager.apply_first_page(vec![]);
        assert!(!pager.has_more());
    }

    #[test]
    fn test_select_category_resets() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top")]);
        pager.request_next_page();
        pager.apply_page(vec![]);

        pager.select_category(Category::Bottom);
        assert_eq!(pager.category(), Category::Bottom);
        assert!(pager.items().is_empty());
        assert!(pager.has_more());
        assert_eq!(pager.next_offset(), 0);
    }

    #[test]
    fn test_saved_item_updates_in_place() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top"), item(2, "top")]);

        let mut updated = item(2, "top");
        updated.name = "renamed".to_string();
        assert!(pager.apply_saved(updated));
        assert_eq!(pager.items()[1].name, "renamed");
    }

    #[test]
    fn test_saved_item_with_new_category_leaves_filtered_view() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top"), item(2, "top")]);

        assert!(pager.apply_saved(item(2, "bottom")));
        assert_eq!(ids(&pager), vec![1]);
    }

    #[test]
    fn test_saved_item_with_new_category_stays_in_all_view() {
        let mut pager = GalleryPager::new(Category::All, 3);
        pager.apply_first_page(vec![item(1, "top"), item(2, "top")]);

        assert!(pager.apply_saved(item(2, "bottom")));
        assert_eq!(pager.items()[1].category, "bottom");
    }

    #[test]
    fn test_unknown_saved_item_is_ignored() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top")]);
        assert!(!pager.apply_saved(item(9, "top")));
        assert_eq!(ids(&pager), vec![1]);
    }

    #[test]
    fn test_remove() {
        let mut pager = GalleryPager::new(Category::Top, 3);
        pager.apply_first_page(vec![item(1, "top"), item(2, "top")]);
        assert!(pager.remove(1));
        assert!(!pager.remove(1));
        assert_eq!(ids(&pager), vec![2]);
    }
}
