//! Shopping list: categories of items plus which items are checked off.
//!
//! Two files, so the list can be edited without losing checks:
//!
//! ```json
//! // shopping-list.json
//! { "Groceries": ["Oats", "Eggs"], "Pharmacy": ["Vitamin C"] }
//! // shopping-checked.json
//! ["Groceries|Eggs"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::{AgendaError, Result};
use crate::fs_util::{read_json, write_json_atomic};
use crate::storage::StorageConfig;

type Categories = BTreeMap<String, Vec<String>>;

fn default_list() -> Categories {
    let mut list = Categories::new();
    list.insert(
        "Groceries".to_string(),
        ["Oats", "Eggs", "Bananas", "Peanut butter", "Rice", "Beans"]
            .map(String::from)
            .to_vec(),
    );
    list.insert(
        "Pharmacy".to_string(),
        ["Vitamin C", "Sunscreen"].map(String::from).to_vec(),
    );
    list.insert(
        "Hygiene".to_string(),
        ["Soap", "Shampoo", "Toothpaste"].map(String::from).to_vec(),
    );
    list
}

/// Key of a checked item: `"category|item"`.
pub fn item_key(category: &str, item: &str) -> String {
    format!("{category}|{item}")
}

pub struct ShoppingList {
    categories: Categories,
    checked: BTreeSet<String>,
    list_path: Option<PathBuf>,
    checked_path: Option<PathBuf>,
}

impl ShoppingList {
    pub fn new_in_memory() -> Self {
        Self {
            categories: default_list(),
            checked: BTreeSet::new(),
            list_path: None,
            checked_path: None,
        }
    }

    /// A missing list file is seeded with the defaults and written back.
    /// A corrupt one falls back to defaults without overwriting it.
    pub fn load(storage: &StorageConfig) -> Self {
        let list_path = storage.shopping_list_file();
        let checked_path = storage.shopping_checked_file();

        let categories = match read_json::<Categories>(&list_path) {
            Some(c) => c,
            None => {
                let defaults = default_list();
                if !list_path.exists() {
                    if let Err(e) = write_json_atomic(&list_path, &defaults) {
                        tracing::warn!(error = %e, "Failed to seed shopping list");
                    }
                }
                defaults
            }
        };
        let checked = read_json::<BTreeSet<String>>(&checked_path).unwrap_or_default();

        Self {
            categories,
            checked,
            list_path: Some(list_path),
            checked_path: Some(checked_path),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    pub fn is_checked(&self, category: &str, item: &str) -> bool {
        self.checked.contains(&item_key(category, item))
    }

    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AgendaError::EmptyName);
        }
        if self.categories.contains_key(name) {
            return Err(AgendaError::Duplicate(name.to_string()));
        }
        self.categories.insert(name.to_string(), Vec::new());
        self.save_list()
    }

    /// Removes a category and any checks on its items.
    pub fn remove_category(&mut self, name: &str) -> Result<()> {
        if self.categories.remove(name).is_none() {
            return Err(AgendaError::UnknownCategory(name.to_string()));
        }
        let prefix = format!("{name}|");
        self.checked.retain(|k| !k.starts_with(&prefix));
        self.save_checked()?;
        self.save_list()
    }

    pub fn add_item(&mut self, category: &str, item: &str) -> Result<()> {
        let item = item.trim();
        let items = self
            .categories
            .get_mut(category)
            .ok_or_else(|| AgendaError::UnknownCategory(category.to_string()))?;
        if item.is_empty() {
            return Ok(());
        }
        if items.iter().any(|i| i == item) {
            return Err(AgendaError::Duplicate(item.to_string()));
        }
        items.push(item.to_string());
        self.save_list()
    }

    /// Removes an item and unchecks it.
    pub fn remove_item(&mut self, category: &str, item: &str) -> Result<()> {
        let items = self
            .categories
            .get_mut(category)
            .ok_or_else(|| AgendaError::UnknownCategory(category.to_string()))?;
        let before = items.len();
        items.retain(|i| i != item);
        if items.len() == before {
            return Ok(());
        }
        if self.checked.remove(&item_key(category, item)) {
            self.save_checked()?;
        }
        self.save_list()
    }

    /// Flips an item's check mark and returns the new value.
    pub fn toggle(&mut self, category: &str, item: &str) -> Result<bool> {
        let known = self
            .categories
            .get(category)
            .is_some_and(|items| items.iter().any(|i| i == item));
        if !known {
            return Err(AgendaError::UnknownCategory(item_key(category, item)));
        }

        let key = item_key(category, item);
        let checked = if self.checked.remove(&key) {
            false
        } else {
            self.checked.insert(key);
            true
        };
        self.save_checked()?;
        Ok(checked)
    }

    pub fn reset_checked(&mut self) -> Result<()> {
        self.checked.clear();
        self.save_checked()
    }

    fn save_list(&self) -> Result<()> {
        match &self.list_path {
            Some(path) => write_json_atomic(path, &self.categories),
            None => Ok(()),
        }
    }

    fn save_checked(&self) -> Result<()> {
        match &self.checked_path {
            Some(path) => write_json_atomic(path, &self.checked),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_err as fs;
    use tempfile::tempdir;

    #[test]
    fn test_first_load_seeds_defaults() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::new(temp.path());

        let list = ShoppingList::load(&storage);
        assert!(list.categories().any(|(name, _)| name == "Groceries"));
        assert!(storage.shopping_list_file().exists());
    }

    #[test]
    fn test_corrupt_list_is_not_overwritten() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::new(temp.path());
        fs::write(storage.shopping_list_file(), "[broken").unwrap();

        let list = ShoppingList::load(&storage);
        assert!(list.categories().count() > 0);
        assert_eq!(
            fs::read_to_string(storage.shopping_list_file()).unwrap(),
            "[broken"
        );
    }

    #[test]
    fn test_toggle_persists() {
        let temp = tempdir().unwrap();
        let storage = StorageConfig::new(temp.path());

        {
            let mut list = ShoppingList::load(&storage);
            assert!(list.toggle("Groceries", "Eggs").unwrap());
        }

        let mut list = ShoppingList::load(&storage);
        assert!(list.is_checked("Groceries", "Eggs"));
        assert!(!list.toggle("Groceries", "Eggs").unwrap());
        assert_eq!(list.checked_count(), 0);
    }

    #[test]
    fn test_toggle_unknown_item_fails() {
        let mut list = ShoppingList::new_in_memory();
        assert!(list.toggle("Groceries", "Caviar").is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut list = ShoppingList::new_in_memory();
        assert!(matches!(
            list.add_category("Groceries"),
            Err(AgendaError::Duplicate(_))
        ));
        assert!(matches!(
            list.add_item("Groceries", " Eggs "),
            Err(AgendaError::Duplicate(_))
        ));
    }

    #[test]
    fn test_remove_category_drops_its_checks() {
        let mut list = ShoppingList::new_in_memory();
        list.toggle("Groceries", "Eggs").unwrap();
        list.toggle("Pharmacy", "Sunscreen").unwrap();

        list.remove_category("Groceries").unwrap();

        assert!(!list.is_checked("Groceries", "Eggs"));
        assert!(list.is_checked("Pharmacy", "Sunscreen"));
        assert_eq!(list.checked_count(), 1);
    }

    #[test]
    fn test_remove_item_unchecks_it() {
        let mut list = ShoppingList::new_in_memory();
        list.add_category("Hardware").unwrap();
        list.add_item("Hardware", "Screws").unwrap();
        list.toggle("Hardware", "Screws").unwrap();

        list.remove_item("Hardware", "Screws").unwrap();
        assert_eq!(list.checked_count(), 0);
        assert!(list
            .categories()
            .any(|(name, items)| name == "Hardware" && items.is_empty()));
    }

    #[test]
    fn test_reset_checked() {
        let mut list = ShoppingList::new_in_memory();
        list.toggle("Groceries", "Oats").unwrap();
        list.reset_checked().unwrap();
        assert_eq!(list.checked_count(), 0);
    }
}
