use std::{fmt, io::Write, str::FromStr};

use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::{AsChangeset, Insertable, Queryable, Selectable},
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{dishes, order_items, orders, review_replies, reviews, users};

// Enums stored as upper-case TEXT columns, same spelling on the wire
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
        #[diesel(sql_type = Text)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("{} is not a valid {}", other, stringify!($name)))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ToSql<Text, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let text = std::str::from_utf8(bytes.as_bytes())?;
                text.parse::<$name>().map_err(Into::into)
            }
        }
    };
}

text_enum!(Role {
    User => "USER",
    Staff => "STAFF",
    Admin => "ADMIN",
    SuperAdmin => "SUPER_ADMIN",
});

text_enum!(OrderStatus {
    Pending => "PENDING",
    Confirmed => "CONFIRMED",
    Preparing => "PREPARING",
    Ready => "READY",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

text_enum!(ReviewStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_staff_or_above(&self) -> bool {
        matches!(self, Role::Staff | Role::Admin | Role::SuperAdmin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
pub struct User{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    // argon2 PHC string, never serialized
    pub password: String,
    pub telephone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = users)]
pub struct UserChanges{
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub telephone: Option<String>,
    pub role: Option<Role>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = dishes)]
pub struct Dish{
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: i64,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = dishes)]
pub struct DishChanges{
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = orders)]
pub struct Order{
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret_code: String,
    pub total: i64,
    pub seats: i32,
    pub payment_method: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = order_items)]
pub struct OrderItem{
    pub id: Uuid,
    pub order_id: Uuid,
    pub dish_id: Uuid,
    pub quantity: i32,
    // Dish price when the order was placed
    pub price: i64
}

// Order along with its order_items
#[derive(Debug, Clone, PartialEq)]
pub struct OrderWithItems{
    pub order: Order,
    pub items: Vec<OrderItem>
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = reviews)]
pub struct Review{
    pub id: Uuid,
    pub user_id: Uuid,
    pub dish_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub status: ReviewStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = reviews)]
pub struct ReviewChanges{
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub status: Option<ReviewStatus>,
    pub featured: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = review_replies)]
pub struct ReviewReply{
    pub id: Uuid,
    pub review_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>
}
