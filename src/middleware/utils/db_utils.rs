use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum QryOrder {
    ASC,
    DESC,
}

impl fmt::Display for QryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QryOrder::ASC => write!(f, "ASC"),
            QryOrder::DESC => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub order_dir: Option<QryOrder>,
    pub start: u32,
    pub count: u16,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            order_dir: None,
            start: 0,
            count: 50,
        }
    }
}
