use mockall::mock;
use order_desk_engine::{
    db_types::{Article, ArticleUpdate, Credentials, Group, LineItem, NewArticle, NewGroup, NewUser, User, UserUpdate},
    order_objects::{FullOrder, LineItemChange, NewOrder, OrderArticle, OrderResult, OrderUpdate, ResolvedLine},
    reconciliation::ArticleLookup,
    traits::{
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

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_articles(&self) -> Result<Vec<Article>, CatalogApiError>;
        async fn fetch_article(&self, id: i64) -> Result<Option<Article>, CatalogApiError>;
        async fn fetch_articles_by_reference(&self, reference: &str) -> Result<Vec<Article>, CatalogApiError>;
        async fn insert_article(&self, article: NewArticle) -> Result<Article, CatalogApiError>;
        async fn update_article(&self, id: i64, update: ArticleUpdate) -> Result<Option<Article>, CatalogApiError>;
        async fn delete_article(&self, id: i64) -> Result<bool, CatalogApiError>;
    }
}

// Order flows resolve references against the catalog, so this mock carries both traits.
mock! {
    pub OrderManager {}
    impl CatalogManagement for OrderManager {
        async fn fetch_articles(&self) -> Result<Vec<Article>, CatalogApiError>;
        async fn fetch_article(&self, id: i64) -> Result<Option<Article>, CatalogApiError>;
        async fn fetch_articles_by_reference(&self, reference: &str) -> Result<Vec<Article>, CatalogApiError>;
        async fn insert_article(&self, article: NewArticle) -> Result<Article, CatalogApiError>;
        async fn update_article(&self, id: i64, update: ArticleUpdate) -> Result<Option<Article>, CatalogApiError>;
        async fn delete_article(&self, id: i64) -> Result<bool, CatalogApiError>;
    }
    impl OrderManagement for OrderManager {
        async fn fetch_orders(&self) -> Result<Vec<FullOrder>, OrderFlowError>;
        async fn fetch_order(&self, id: i64) -> Result<Option<FullOrder>, OrderFlowError>;
        async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<LineItem>, OrderFlowError>;
        async fn insert_order(&self, order: NewOrder, lookup: &ArticleLookup) -> Result<OrderResult, OrderFlowError>;
        async fn update_order(&self, id: i64, update: OrderUpdate, lookup: &ArticleLookup) -> Result<Option<OrderResult>, OrderFlowError>;
        async fn delete_order(&self, id: i64) -> Result<bool, OrderFlowError>;
        async fn fetch_order_articles(&self) -> Result<Vec<OrderArticle>, OrderFlowError>;
        async fn fetch_order_article(&self, id: i64) -> Result<Option<OrderArticle>, OrderFlowError>;
        async fn insert_order_article(&self, line: ResolvedLine) -> Result<OrderArticle, OrderFlowError>;
        async fn update_order_article(&self, id: i64, change: LineItemChange) -> Result<Option<OrderArticle>, OrderFlowError>;
        async fn delete_order_article(&self, id: i64) -> Result<bool, OrderFlowError>;
    }
}

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_users(&self) -> Result<Vec<User>, AccountApiError>;
        async fn fetch_user(&self, id: i64) -> Result<Option<User>, AccountApiError>;
        async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, AccountApiError>;
        async fn insert_user(&self, user: NewUser, password_hash: Option<String>) -> Result<User, AccountApiError>;
        async fn update_user(&self, id: i64, update: UserUpdate, password_hash: Option<String>) -> Result<Option<User>, AccountApiError>;
        async fn delete_user(&self, id: i64) -> Result<bool, AccountApiError>;
        async fn fetch_groups(&self) -> Result<Vec<Group>, AccountApiError>;
        async fn fetch_group(&self, id: i64) -> Result<Option<Group>, AccountApiError>;
        async fn insert_group(&self, group: NewGroup) -> Result<Group, AccountApiError>;
        async fn update_group(&self, id: i64, group: NewGroup) -> Result<Option<Group>, AccountApiError>;
        async fn delete_group(&self, id: i64) -> Result<bool, AccountApiError>;
    }
}

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn fetch_credentials(&self, username: &str) -> Result<Option<Credentials>, AuthApiError>;
    }
}
