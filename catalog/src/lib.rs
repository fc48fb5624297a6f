//! # Catalog
//!
//! Reference data for the game service: the unlockable-item list and the
//! achievement rule set.
//!
//! The catalog is owned by the CMS, not by this service. We only read it:
//! either from a local JSON file baked into the deployment or fetched from
//! the published CMS export at startup. Items and rules are immutable for
//! the lifetime of the process.

use std::fs;

use serde::Deserialize;
use thiserror::Error;

pub mod rules;

use rules::{AchievementRule, default_rules};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to fetch catalog: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How a catalog item becomes accessible.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockRequirement {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "purchase")]
    Purchase,
    #[serde(rename = "game-score")]
    GameScore,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub unlock_requirement: UnlockRequirement,
    /// Threshold for `game-score` items. The CMS omits it on legacy entries,
    /// which have always meant 150.
    #[serde(default = "default_score_required")]
    pub score_required: u32,
}

fn default_score_required() -> u32 {
    150
}

#[derive(Deserialize)]
struct CatalogFile {
    items: Vec<CatalogItem>,
    rules: Option<Vec<AchievementRule>>,
}

pub struct Catalog {
    items: Vec<CatalogItem>,
    rules: Vec<AchievementRule>,
}

impl Catalog {
    pub fn from_parts(items: Vec<CatalogItem>, rules: Vec<AchievementRule>) -> Self {
        Self { items, rules }
    }

    pub fn find_item(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items earnable through gameplay, in catalog order.
    pub fn game_unlock_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.unlock_requirement == UnlockRequirement::GameScore)
    }

    /// Achievement rules, in declaration order.
    pub fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }
}

fn from_file(file: CatalogFile) -> Catalog {
    Catalog {
        items: file.items,
        rules: file.rules.unwrap_or_else(default_rules),
    }
}

pub fn get_catalog(path: &str) -> Result<Catalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    let file: CatalogFile = serde_json::from_str(&data)?;

    Ok(from_file(file))
}

pub async fn get_catalog_remote(url: &str) -> Result<Catalog, CatalogError> {
    let file: CatalogFile = reqwest::get(url).await?.json().await?;

    Ok(from_file(file))
}
