//! Shared catalog fixtures for unit tests.

use rust_decimal::Decimal;

use larder_core::Entity;

use crate::combo::Combo;
use crate::dish::Dish;
use crate::ingredient::Ingredient;
use crate::store::sealed::Table;
use crate::store::{CatalogStore, Stored};

pub(crate) fn salt() -> Ingredient {
    Ingredient::new(
        "SALT",
        "Salt",
        "g",
        Decimal::from(10),
        Decimal::from(2),
        Decimal::from(1000),
    )
    .unwrap()
}

pub(crate) fn beef() -> Ingredient {
    Ingredient::new(
        "BEEF",
        "Beef",
        "kg",
        Decimal::from(5),
        Decimal::from(1),
        Decimal::from(200000),
    )
    .unwrap()
}

/// 3 SALT per serving.
pub(crate) fn soup() -> Dish {
    Dish::new("SOUP", "Soup", "Main", Decimal::from(50000))
        .unwrap()
        .with_ingredient("SALT", Decimal::from(3))
}

/// 4 SALT + 1 BEEF per serving.
pub(crate) fn stew() -> Dish {
    Dish::new("STEW", "Beef stew", "Main", Decimal::from(80000))
        .unwrap()
        .with_ingredient("SALT", Decimal::from(4))
        .with_ingredient("BEEF", Decimal::ONE)
}

/// SOUP + STEW at 10% off.
pub(crate) fn duo() -> Combo {
    Combo::new("DUO", "Soup and stew", Decimal::from(10))
        .unwrap()
        .with_dish("SOUP")
        .with_dish("STEW")
}

pub(crate) fn put<E: Stored>(store: &mut CatalogStore, mut entity: E) {
    entity.refresh_derived(store).unwrap();
    E::table_mut(store).insert(entity.id().clone(), entity);
}

/// SALT (10 on hand) and SOUP.
pub(crate) fn salt_and_soup() -> CatalogStore {
    let mut store = CatalogStore::new();
    put(&mut store, salt());
    put(&mut store, soup());
    store
}

/// SALT, BEEF, SOUP, STEW and the DUO combo.
pub(crate) fn kitchen_store() -> CatalogStore {
    let mut store = salt_and_soup();
    put(&mut store, beef());
    put(&mut store, stew());
    put(&mut store, duo());
    store
}
