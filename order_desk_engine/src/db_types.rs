use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use ods_common::{
    serde_helpers::{lenient_f64, lenient_opt_f64},
    Money,
    Secret,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

pub const MAX_REFERENCE_LENGTH: usize = 30;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 250;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_GROUP_NAME_LENGTH: usize = 150;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn check_text(field: &str, value: &str, max_len: usize, allow_empty: bool) -> Result<(), ValidationError> {
    if !allow_empty && value.trim().is_empty() {
        return Err(ValidationError(format!("{field} may not be blank")));
    }
    if value.chars().count() > max_len {
        return Err(ValidationError(format!("{field} must be at most {max_len} characters")));
    }
    Ok(())
}

fn check_money(field: &str, value: f64) -> Result<(), ValidationError> {
    if Money::from(value).is_valid_price() {
        Ok(())
    } else {
        Err(ValidationError(format!("{field} must be a non-negative number")))
    }
}

//--------------------------------------        Article        ---------------------------------------------------------
/// A catalog item. `reference` is the business key that orders use to refer to the article. It is _not_ guaranteed to
/// be unique.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub reference: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    /// Tax rate as a percentage, e.g. `21.0` for 21%
    pub tax: f64,
    pub creation_date: NaiveDate,
}

impl Article {
    /// The tax-inclusive unit price
    pub fn price_with_tax(&self) -> Money {
        self.price.with_tax(self.tax)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub reference: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub tax: f64,
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

impl NewArticle {
    pub fn new<S: Into<String>>(reference: S, name: S, price: f64, tax: f64) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            description: String::default(),
            price,
            tax,
            creation_date: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("reference", &self.reference, MAX_REFERENCE_LENGTH, false)?;
        check_text("name", &self.name, MAX_NAME_LENGTH, false)?;
        check_text("description", &self.description, MAX_DESCRIPTION_LENGTH, true)?;
        check_money("price", self.price)?;
        check_money("tax", self.tax)
    }
}

/// A partial article update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleUpdate {
    pub reference: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub tax: Option<f64>,
    pub creation_date: Option<NaiveDate>,
}

impl ArticleUpdate {
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_tax(mut self, tax: f64) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_none() &&
            self.name.is_none() &&
            self.description.is_none() &&
            self.price.is_none() &&
            self.tax.is_none() &&
            self.creation_date.is_none()
    }

    /// True if the update touches a field that feeds into order totals.
    pub fn changes_pricing(&self) -> bool {
        self.price.is_some() || self.tax.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(reference) = &self.reference {
            check_text("reference", reference, MAX_REFERENCE_LENGTH, false)?;
        }
        if let Some(name) = &self.name {
            check_text("name", name, MAX_NAME_LENGTH, false)?;
        }
        if let Some(description) = &self.description {
            check_text("description", description, MAX_DESCRIPTION_LENGTH, true)?;
        }
        if let Some(price) = self.price {
            check_money("price", price)?;
        }
        if let Some(tax) = self.tax {
            check_money("tax", tax)?;
        }
        Ok(())
    }
}

/// A full replacement is an update of every field. An omitted creation date keeps the stored one.
impl From<NewArticle> for ArticleUpdate {
    fn from(article: NewArticle) -> Self {
        Self {
            reference: Some(article.reference),
            name: Some(article.name),
            description: Some(article.description),
            price: Some(article.price),
            tax: Some(article.tax),
            creation_date: article.creation_date,
        }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
/// The order header as stored. The totals are derived from the order's line items and are never set by clients.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub price: Money,
    pub tax_price: Money,
    pub creation_date: NaiveDate,
}

//--------------------------------------        LineItem       ---------------------------------------------------------
/// A quantity of one article within one order.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub article_id: i64,
    pub amount: u32,
}

//--------------------------------------          Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Every authenticated account
    User,
    /// May manage users and groups
    Admin,
}

pub type Roles = Vec<Role>;

impl Role {
    pub fn for_account(is_admin: bool) -> Roles {
        if is_admin {
            vec![Role::User, Role::Admin]
        } else {
            vec![Role::User]
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

//--------------------------------------          User         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub date_joined: DateTime<Utc>,
    /// Ids of the groups this user belongs to
    pub groups: Vec<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub date_joined: DateTime<Utc>,
}

impl UserRecord {
    pub fn into_user(self, groups: Vec<i64>) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            is_admin: self.is_admin,
            date_joined: self.date_joined,
            groups,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<Secret<String>>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub groups: Vec<i64>,
}

impl NewUser {
    pub fn new<S: Into<String>>(username: S) -> Self {
        Self { username: username.into(), email: String::default(), password: None, is_admin: false, groups: vec![] }
    }

    pub fn with_password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(Secret::new(password.into()));
        self
    }

    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("username", &self.username, MAX_USERNAME_LENGTH, false)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<Secret<String>>,
    pub is_admin: Option<bool>,
    pub groups: Option<Vec<i64>>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.username {
            Some(username) => check_text("username", username, MAX_USERNAME_LENGTH, false),
            None => Ok(()),
        }
    }
}

/// A full replacement keeps the stored password unless a new one is given.
impl From<NewUser> for UserUpdate {
    fn from(user: NewUser) -> Self {
        Self {
            username: Some(user.username),
            email: Some(user.email),
            password: user.password,
            is_admin: Some(user.is_admin),
            groups: Some(user.groups),
        }
    }
}

/// What the auth flow needs to know about an account
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub id: i64,
    pub username: String,
    pub password_hash: Option<String>,
    pub is_admin: bool,
}

//--------------------------------------         Group         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
}

impl NewGroup {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, MAX_GROUP_NAME_LENGTH, false)
    }
}
