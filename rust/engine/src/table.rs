use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// A table in the lobby: the bet it costs to play a round and what a win pays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub id: String,
    pub name: String,
    /// Deducted when the first roll of a round is made; 0 for a free table
    pub bet: u32,
    /// Fixed amount credited on a win; `None` pays twice the bet
    #[serde(default)]
    pub payout: Option<u32>,
}

impl TableConfig {
    pub fn new(id: &str, name: &str, bet: u32, payout: Option<u32>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            bet,
            payout,
        }
    }

    pub fn is_free(&self) -> bool {
        self.bet == 0
    }

    pub fn win_payout(&self) -> u32 {
        self.payout.unwrap_or_else(|| self.bet.saturating_mul(2))
    }

    /// Free tables never check the bankroll.
    pub fn can_afford(&self, bankroll: u32) -> bool {
        self.is_free() || bankroll >= self.bet
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCatalog {
    tables: Vec<TableConfig>,
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self {
            tables: vec![
                TableConfig::new("free", "Free Table", 0, Some(5)),
                TableConfig::new("bronze", "Bronze Table", 10, None),
                TableConfig::new("silver", "Silver Table", 50, None),
                TableConfig::new("gold", "Gold Table", 250, None),
            ],
        }
    }
}

impl TableCatalog {
    /// Builds a catalog after validating every table definition.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidTable`] when the catalog is empty, an id is
    /// blank or repeated, or a free table has no fixed payout (a win would pay
    /// nothing).
    ///
    /// ```
    /// use alea_engine::table::{TableCatalog, TableConfig};
    ///
    /// let catalog = TableCatalog::new(vec![TableConfig::new("house", "House", 20, None)]).unwrap();
    /// assert_eq!(catalog.get("house").unwrap().win_payout(), 40);
    ///
    /// let bad = TableCatalog::new(vec![TableConfig::new("free", "Free", 0, None)]);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(tables: Vec<TableConfig>) -> Result<Self, GameError> {
        if tables.is_empty() {
            return Err(GameError::InvalidTable("catalog has no tables".into()));
        }
        for (i, t) in tables.iter().enumerate() {
            if t.id.trim().is_empty() {
                return Err(GameError::InvalidTable(format!("table #{} has an empty id", i)));
            }
            if tables[..i].iter().any(|prev| prev.id == t.id) {
                return Err(GameError::InvalidTable(format!("duplicate table id '{}'", t.id)));
            }
            if t.is_free() && t.payout.is_none() {
                return Err(GameError::InvalidTable(format!(
                    "free table '{}' needs a fixed payout",
                    t.id
                )));
            }
        }
        Ok(Self { tables })
    }

    pub fn get(&self, id: &str) -> Result<&TableConfig, GameError> {
        self.tables
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| GameError::UnknownTable(id.to_string()))
    }

    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.id.as_str()).collect()
    }
}
