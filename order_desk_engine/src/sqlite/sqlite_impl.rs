//! `SqliteDatabase` is the SQLite implementation of an Order Desk engine backend.
//!
//! It implements all the traits defined in the [`crate::traits`] module. Every mutating method runs in a single
//! transaction, and order totals are recomputed inside that transaction whenever line items or article prices change.
use std::{collections::HashMap, fmt::Debug};

use chrono::{Local, NaiveDate};
use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};

use super::db::{articles, db_url, groups, line_items, new_pool, orders, users};
use crate::{
    db_types::{
        Article,
        ArticleUpdate,
        Credentials,
        Group,
        LineItem,
        NewArticle,
        NewGroup,
        NewUser,
        Order,
        User,
        UserUpdate,
    },
    ode_api::{
        order_objects::{
            FullOrder,
            LineItemChange,
            NewOrder,
            OrderArticle,
            OrderLine,
            OrderResult,
            OrderUpdate,
            ResolvedLine,
        },
        reconciliation::{plan_creation, plan_update, ArticleLookup, LinePlan},
    },
    traits::{
        is_unique_violation,
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        CatalogApiError,
        CatalogManagement,
        OrderFlowError,
        OrderManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn full_order(order: Order, conn: &mut SqliteConnection) -> Result<FullOrder, sqlx::Error> {
    let lines = line_items::fetch_lines_for_order(order.id, conn).await?;
    Ok(FullOrder::new(order, lines))
}

/// Re-reads an order after its totals were recomputed in the current transaction.
async fn reload_order(id: i64, conn: &mut SqliteConnection) -> Result<FullOrder, OrderFlowError> {
    orders::recompute_totals(id, &mut *conn).await?;
    let order = orders::fetch_by_id(id, &mut *conn).await?.ok_or(OrderFlowError::OrderNotFound(id))?;
    Ok(full_order(order, conn).await?)
}

async fn apply_plan(order_id: i64, plan: &mut LinePlan, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for id in &plan.deletions {
        line_items::delete(*id, &mut *conn).await?;
        trace!("🗃️ Line item #{id} removed from order #{order_id}");
    }
    for (id, amount) in &plan.amount_updates {
        line_items::set_amount(*id, *amount, &mut *conn).await?;
    }
    for line in plan.insertions.clone() {
        let id = line_items::insert(order_id, line.article_id, line.amount, &mut *conn).await?;
        plan.record_insert(line.position, id);
        trace!("🗃️ Line item #{id} ({} x article #{}) added to order #{order_id}", line.amount, line.article_id);
    }
    Ok(())
}

async fn recompute_orders(order_ids: &[i64], conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for id in order_ids {
        orders::recompute_totals(*id, &mut *conn).await?;
    }
    Ok(())
}

fn unique_or<F>(e: sqlx::Error, on_conflict: F) -> AccountApiError
where F: FnOnce() -> AccountApiError {
    if is_unique_violation(&e) {
        on_conflict()
    } else {
        AccountApiError::from(e)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_articles(&self) -> Result<Vec<Article>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(articles::fetch_all(&mut conn).await?)
    }

    async fn fetch_article(&self, id: i64) -> Result<Option<Article>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(articles::fetch_by_id(id, &mut conn).await?)
    }

    async fn fetch_articles_by_reference(&self, reference: &str) -> Result<Vec<Article>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(articles::fetch_by_reference(reference, &mut conn).await?)
    }

    async fn insert_article(&self, article: NewArticle) -> Result<Article, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let date = article.creation_date.unwrap_or_else(today);
        let article = articles::insert(article, date, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Article #{} saved", article.id);
        Ok(article)
    }

    async fn update_article(&self, id: i64, update: ArticleUpdate) -> Result<Option<Article>, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let reprice = update.changes_pricing();
        let article = articles::update(id, update, &mut tx).await?;
        if article.is_some() && reprice {
            let affected = articles::orders_containing(id, &mut tx).await?;
            recompute_orders(&affected, &mut tx).await?;
            debug!("🗃️ Article #{id} price changed. Totals recomputed for {} orders", affected.len());
        }
        tx.commit().await?;
        Ok(article)
    }

    async fn delete_article(&self, id: i64) -> Result<bool, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let affected = articles::orders_containing(id, &mut tx).await?;
        let deleted = articles::delete(id, &mut tx).await?;
        if deleted {
            recompute_orders(&affected, &mut tx).await?;
            debug!("🗃️ Article #{id} deleted. Line items removed from {} orders", affected.len());
        }
        tx.commit().await?;
        Ok(deleted)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_orders(&self) -> Result<Vec<FullOrder>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let headers = orders::fetch_all(&mut conn).await?;
        let mut lines: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for row in line_items::fetch_all_rows(&mut conn).await? {
            lines.entry(row.order_id).or_default().push(OrderLine::from(row));
        }
        let result: Vec<FullOrder> = headers
            .into_iter()
            .map(|order| {
                let order_lines = lines.remove(&order.id).unwrap_or_default();
                FullOrder::new(order, order_lines)
            })
            .collect();
        Ok(result)
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<FullOrder>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        match orders::fetch_by_id(id, &mut conn).await? {
            Some(order) => Ok(Some(full_order(order, &mut conn).await?)),
            None => Ok(None),
        }
    }

    async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<LineItem>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(line_items::fetch_items(order_id, &mut conn).await?)
    }

    async fn insert_order(&self, order: NewOrder, lookup: &ArticleLookup) -> Result<OrderResult, OrderFlowError> {
        let mut plan = plan_creation(&order.articles, lookup);
        let mut tx = self.pool.begin().await?;
        let header = orders::insert(order.creation_date.unwrap_or_else(today), &mut tx).await?;
        apply_plan(header.id, &mut plan, &mut tx).await?;
        let full = reload_order(header.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} saved. {} lines skipped", full.id, plan.rejected_count());
        Ok(OrderResult { order: full, line_results: plan.results })
    }

    async fn update_order(
        &self,
        id: i64,
        update: OrderUpdate,
        lookup: &ArticleLookup,
    ) -> Result<Option<OrderResult>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        if orders::fetch_by_id(id, &mut tx).await?.is_none() {
            return Ok(None);
        }
        if let Some(date) = update.creation_date {
            orders::set_creation_date(id, date, &mut tx).await?;
        }
        let mut line_results = Vec::new();
        if let Some(incoming) = update.articles {
            let existing = line_items::fetch_items(id, &mut tx).await?;
            let mut plan = plan_update(&existing, &incoming, lookup);
            apply_plan(id, &mut plan, &mut tx).await?;
            debug!(
                "🗃️ Order #{id} reconciled: {} updated, {} added, {} removed, {} skipped",
                plan.amount_updates.len(),
                plan.insertions.len(),
                plan.deletions.len(),
                plan.rejected_count()
            );
            line_results = plan.results;
        }
        let full = reload_order(id, &mut tx).await?;
        tx.commit().await?;
        Ok(Some(OrderResult { order: full, line_results }))
    }

    async fn delete_order(&self, id: i64) -> Result<bool, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let deleted = orders::delete(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn fetch_order_articles(&self) -> Result<Vec<OrderArticle>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(line_items::fetch_all_by_amount(&mut conn).await?)
    }

    async fn fetch_order_article(&self, id: i64) -> Result<Option<OrderArticle>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        Ok(line_items::fetch_row(id, &mut conn).await?.map(OrderArticle::from))
    }

    async fn insert_order_article(&self, line: ResolvedLine) -> Result<OrderArticle, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        if orders::fetch_by_id(line.order_id, &mut tx).await?.is_none() {
            return Err(OrderFlowError::OrderNotFound(line.order_id));
        }
        if articles::fetch_by_id(line.article_id, &mut tx).await?.is_none() {
            return Err(OrderFlowError::ArticleNotFound(line.article_id));
        }
        let id = line_items::insert(line.order_id, line.article_id, line.amount, &mut tx).await?;
        orders::recompute_totals(line.order_id, &mut tx).await?;
        let row = line_items::fetch_row(id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::DatabaseError(format!("Line item {id} was not saved")))?;
        tx.commit().await?;
        Ok(OrderArticle::from(row))
    }

    async fn update_order_article(
        &self,
        id: i64,
        change: LineItemChange,
    ) -> Result<Option<OrderArticle>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let Some(item) = line_items::fetch_item(id, &mut tx).await? else {
            return Ok(None);
        };
        let mut affected = vec![item.order_id];
        if let Some(order_id) = change.order_id.filter(|o| *o != item.order_id) {
            if orders::fetch_by_id(order_id, &mut tx).await?.is_none() {
                return Err(OrderFlowError::OrderNotFound(order_id));
            }
            affected.push(order_id);
        }
        line_items::update(id, change, &mut tx).await?;
        recompute_orders(&affected, &mut tx).await?;
        let row = line_items::fetch_row(id, &mut tx).await?;
        tx.commit().await?;
        Ok(row.map(OrderArticle::from))
    }

    async fn delete_order_article(&self, id: i64) -> Result<bool, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let Some(item) = line_items::fetch_item(id, &mut tx).await? else {
            return Ok(false);
        };
        line_items::delete(id, &mut tx).await?;
        orders::recompute_totals(item.order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(true)
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_users(&self) -> Result<Vec<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_all(&mut conn).await?)
    }

    async fn fetch_user(&self, id: i64) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_by_id(id, &mut conn).await?)
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_by_username(username, &mut conn).await?)
    }

    async fn insert_user(&self, user: NewUser, password_hash: Option<String>) -> Result<User, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let id = users::insert(&user, password_hash, &mut tx)
            .await
            .map_err(|e| unique_or(e, || AccountApiError::UsernameTaken(user.username.clone())))?;
        users::set_groups(id, &user.groups, &mut tx).await?;
        let saved = users::fetch_by_id(id, &mut tx)
            .await?
            .ok_or_else(|| AccountApiError::DatabaseError(format!("User {id} was not saved")))?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn update_user(
        &self,
        id: i64,
        update: UserUpdate,
        password_hash: Option<String>,
    ) -> Result<Option<User>, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let username = update.username.clone().unwrap_or_default();
        let found = users::update(id, &update, password_hash, &mut tx)
            .await
            .map_err(|e| unique_or(e, || AccountApiError::UsernameTaken(username)))?;
        if !found {
            return Ok(None);
        }
        if let Some(groups) = &update.groups {
            users::set_groups(id, groups, &mut tx).await?;
        }
        let user = users::fetch_by_id(id, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let deleted = users::delete(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn fetch_groups(&self) -> Result<Vec<Group>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(groups::fetch_all(&mut conn).await?)
    }

    async fn fetch_group(&self, id: i64) -> Result<Option<Group>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(groups::fetch_by_id(id, &mut conn).await?)
    }

    async fn insert_group(&self, group: NewGroup) -> Result<Group, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let name = group.name.clone();
        let group =
            groups::insert(group, &mut tx).await.map_err(|e| unique_or(e, || AccountApiError::GroupNameTaken(name)))?;
        tx.commit().await?;
        Ok(group)
    }

    async fn update_group(&self, id: i64, group: NewGroup) -> Result<Option<Group>, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let name = group.name.clone();
        let group =
            groups::rename(id, group, &mut tx).await.map_err(|e| unique_or(e, || AccountApiError::GroupNameTaken(name)))?;
        tx.commit().await?;
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> Result<bool, AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let deleted = groups::delete(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_credentials(&self, username: &str) -> Result<Option<Credentials>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_credentials(username, &mut conn).await?)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `ODS_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
