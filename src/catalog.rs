use std::sync::Arc;

use tracing::debug;

use crate::error::{DietError, Result};
use crate::models::{MenuCatalog, MenuItem, Nutrients, Restaurant};
use crate::storage::Storage;

/// Restaurant and meal names are stored trimmed and lowercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl MenuCatalog {
    pub fn restaurant(&self, name: &str) -> Option<&Restaurant> {
        let key = normalize_name(name);
        self.restaurants.iter().find(|r| r.name == key)
    }

    /// Append `item` under `restaurant`, creating the restaurant at the end
    /// of the list if it is new.
    pub fn add_item(&mut self, restaurant: &str, item: MenuItem) {
        let key = normalize_name(restaurant);
        let item = MenuItem {
            name: normalize_name(&item.name),
            per_unit: item.per_unit,
        };
        match self.restaurants.iter_mut().find(|r| r.name == key) {
            Some(existing) => existing.items.push(item),
            None => self.restaurants.push(Restaurant {
                name: key,
                items: vec![item],
            }),
        }
    }
}

/// Reusable meal templates grouped by restaurant.
pub struct RestaurantCatalog<S> {
    storage: Arc<S>,
}

impl<S> Clone for RestaurantCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> RestaurantCatalog<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Restaurant names in storage order.
    pub async fn list_restaurants(&self) -> Result<Vec<String>> {
        let catalog = self.storage.load_catalog().await?;
        Ok(catalog.restaurants.into_iter().map(|r| r.name).collect())
    }

    pub async fn list_menu(&self, restaurant: &str) -> Result<Vec<MenuItem>> {
        let catalog = self.storage.load_catalog().await?;
        catalog
            .restaurant(restaurant)
            .map(|r| r.items.clone())
            .ok_or_else(|| DietError::not_found("restaurant", normalize_name(restaurant)))
    }

    /// The menu item at 1-based `index` for `restaurant`.
    pub async fn find_item(&self, restaurant: &str, index: usize) -> Result<MenuItem> {
        let menu = self.list_menu(restaurant).await?;
        index
            .checked_sub(1)
            .and_then(|i| menu.into_iter().nth(i))
            .ok_or_else(|| DietError::not_found("menu item", index))
    }

    pub async fn add_menu_item(
        &self,
        restaurant: &str,
        name: &str,
        per_unit: Nutrients,
    ) -> Result<MenuItem> {
        let mut catalog = self.storage.load_catalog().await?;
        let item = MenuItem {
            name: normalize_name(name),
            per_unit,
        };
        catalog.add_item(restaurant, item.clone());
        self.storage.save_catalog(&catalog).await?;
        debug!(restaurant = %normalize_name(restaurant), item = %item.name, "menu item added");
        Ok(item)
    }
}
