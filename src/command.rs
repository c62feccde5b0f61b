//! JSON-lines command protocol for driving a [`Shop`].
//!
//! Each input line is one [`ShopCommand`] tagged by `"type"`; each command
//! produces one [`ShopReply`] line carrying an HTTP-style status and either
//! a body or an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ShopError;
use crate::models::OrderItem;
use crate::shop::Shop;
use crate::snapshot::SnapshotStore;

/// A request read from the command stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopCommand {
    CreateProduct {
        name: String,
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
        quantity: u64,
    },
    ConsultProduct {
        id: u64,
    },
    CreateOrder {
        items: Vec<OrderItem>,
    },
    ConsultOrder {
        id: u64,
    },
    UpdateOrder {
        id: u64,
        items: Vec<OrderItem>,
    },
    DeleteOrder {
        id: u64,
    },
    ListOrders,
    ListProducts,
}

/// Error details attached to a failed reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyError {
    pub code: &'static str,
    pub message: String,
}

/// Response written for each command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopReply {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

impl ShopReply {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status: 200,
                body: Some(value),
                error: None,
            },
            Err(e) => Self::from(ShopError::from(e)),
        }
    }

    /// True when the command succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<ShopError> for ShopReply {
    fn from(err: ShopError) -> Self {
        Self {
            status: err.status(),
            body: None,
            error: Some(ReplyError {
                code: err.code(),
                message: err.to_string(),
            }),
        }
    }
}

/// Runs one command against `shop`.
pub fn execute<S: SnapshotStore>(shop: &Shop<S>, command: ShopCommand) -> ShopReply {
    let result = match command {
        ShopCommand::CreateProduct {
            name,
            price,
            quantity,
        } => shop
            .create_product(&name, price, quantity)
            .map(|entry| ShopReply::ok(&entry)),
        ShopCommand::ConsultProduct { id } => {
            shop.consult_product(id).map(|entry| ShopReply::ok(&entry))
        }
        ShopCommand::CreateOrder { items } => {
            shop.create_order(&items).map(|entry| ShopReply::ok(&entry))
        }
        ShopCommand::ConsultOrder { id } => {
            shop.consult_order(id).map(|entry| ShopReply::ok(&entry))
        }
        ShopCommand::UpdateOrder { id, items } => shop
            .update_order(id, &items)
            .map(|entry| ShopReply::ok(&entry)),
        ShopCommand::DeleteOrder { id } => {
            shop.delete_order(id).map(|entry| ShopReply::ok(&entry))
        }
        ShopCommand::ListOrders => shop.list_orders().map(|orders| ShopReply::ok(&orders)),
        ShopCommand::ListProducts => {
            shop.list_products().map(|products| ShopReply::ok(&products))
        }
    };
    result.unwrap_or_else(ShopReply::from)
}

/// Parses one input line and runs it.
///
/// A line that is not a valid command yields a 400 reply.
pub fn handle_line<S: SnapshotStore>(shop: &Shop<S>, line: &str) -> ShopReply {
    match serde_json::from_str::<ShopCommand>(line) {
        Ok(command) => execute(shop, command),
        Err(e) => ShopReply::from(ShopError::from(e)),
    }
}
