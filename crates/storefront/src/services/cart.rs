//! Cart reconciliation service.
//!
//! The cart has two backing stores behind one contract ([`CartStore`]):
//!
//! - [`SessionCartStore`] - anonymous visitors; a product-id -> quantity map
//!   held in the tower-sessions session.
//! - [`UserCartStore`] - authenticated users; `cart_line` rows in Postgres.
//!
//! [`CartService`] selects the store from an explicit [`CartIdentity`] and
//! reconciles the two at login/signup: every session entry is merged
//! ADDITIVELY into the persisted cart (a returning user's existing cart is
//! preserved and combined with items added while briefly anonymous), then
//! the session map is cleared. The merge loop is not wrapped in a
//! transaction; a failure partway through leaves a partially merged cart and
//! an untouched session map, which re-merges on the next login.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tower_sessions::Session;

use voltbay_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::models::cart::{CartItem, SessionCart};
use crate::models::product::Product;
use crate::models::session_keys;

/// Errors from cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// Referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Quantity outside the range a cart line may hold.
    #[error("quantity {0} is out of range")]
    InvalidQuantity(i64),

    /// Session store failure.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Database failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Largest quantity a single cart line may hold; the persisted column is an
/// `INT4`, and the session map honors the same bound so a merge never meets
/// a value the column cannot take.
pub const MAX_LINE_QUANTITY: i64 = i32::MAX as i64;

/// An `add` increment must be at least 1 and fit the persisted column.
const fn ensure_add_quantity(quantity: i64) -> Result<(), CartError> {
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// An absolute `update` quantity only needs the upper bound: zero or less
/// deletes the line instead of storing it.
const fn ensure_set_quantity(quantity: i64) -> Result<(), CartError> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Product lookup used when resolving session entries and merging them.
///
/// The catalog repository is the production impl; tests substitute an
/// in-memory map so the skip and merge rules run without a database.
trait ProductLookup {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, CartError>;
}

impl ProductLookup for ProductRepository<'_> {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, CartError> {
        Ok(self.get(id).await?)
    }
}

/// Destination for merged cart lines.
trait LineWriter {
    async fn add_line(&mut self, product_id: ProductId, quantity: i64) -> Result<(), CartError>;
}

/// Resolve a session map into product-joined items.
///
/// A session can reference a product that was deactivated or never existed;
/// such lines are dropped, not surfaced as errors.
async fn resolve_items(
    cart: &SessionCart,
    products: &impl ProductLookup,
) -> Result<Vec<CartItem>, CartError> {
    let mut items = Vec::new();
    for (product_id, quantity) in cart.entries() {
        match products.product(product_id).await? {
            Some(product) => items.push(CartItem { product, quantity }),
            None => continue,
        }
    }

    Ok(items)
}

/// Add every session entry into the persisted lines.
///
/// Aborts on the first entry whose product is missing or whose quantity is
/// out of range; entries already written stay written.
async fn merge_entries(
    cart: &SessionCart,
    products: &impl ProductLookup,
    lines: &mut impl LineWriter,
) -> Result<(), CartError> {
    for (product_id, quantity) in cart.entries() {
        ensure_add_quantity(quantity)?;
        if products.product(product_id).await?.is_none() {
            return Err(CartError::ProductNotFound(product_id));
        }
        lines.add_line(product_id, quantity).await?;
    }

    Ok(())
}

/// Whose cart an operation targets.
///
/// Always passed explicitly; services never read identity from ambient
/// request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartIdentity {
    /// Anonymous visitor; cart lives in the session.
    Anonymous,
    /// Logged-in user; cart lives in `cart_line` rows.
    Authenticated(UserId),
}

/// The uniform cart contract both stores implement.
///
/// `update` deletes on a quantity of zero or less instead of storing zero;
/// `remove` of an absent product is a no-op; `items` silently skips session
/// entries whose product no longer exists, and `total` inherits that.
/// Quantities beyond [`MAX_LINE_QUANTITY`] are rejected by both stores, so
/// no bind value ever has to be clamped to fit the column.
pub trait CartStore {
    /// Increment the quantity for a product by `quantity` (default 1 at the
    /// HTTP layer), creating the entry if needed. Increments below 1 are
    /// rejected as `InvalidQuantity`.
    async fn add(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError>;

    /// Set the absolute quantity for a product; ≤ 0 deletes the entry.
    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError>;

    /// Remove a product unconditionally.
    async fn remove(&self, product_id: ProductId) -> Result<(), CartError>;

    /// Resolve the cart into product-joined items.
    async fn items(&self) -> Result<Vec<CartItem>, CartError>;

    /// Total units in the cart.
    async fn count(&self) -> Result<i64, CartError>;

    /// Sum of per-line totals over `items`.
    async fn total(&self) -> Result<Decimal, CartError> {
        Ok(self.items().await?.iter().map(CartItem::line_total).sum())
    }
}

// =============================================================================
// Session-backed store (anonymous)
// =============================================================================

/// Anonymous cart over the session map.
pub struct SessionCartStore<'a> {
    session: &'a Session,
    pool: &'a PgPool,
}

impl<'a> SessionCartStore<'a> {
    /// Create a store over the given session.
    #[must_use]
    pub const fn new(session: &'a Session, pool: &'a PgPool) -> Self {
        Self { session, pool }
    }

    /// Load the cart map from the session, empty when absent.
    async fn load(&self) -> Result<SessionCart, CartError> {
        Ok(self
            .session
            .get::<SessionCart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    /// Write the cart map back, marking the session modified.
    async fn save(&self, cart: &SessionCart) -> Result<(), CartError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }
}

impl CartStore for SessionCartStore<'_> {
    async fn add(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        ensure_add_quantity(quantity)?;
        let mut cart = self.load().await?;
        cart.add(product_id, quantity);
        self.save(&cart).await
    }

    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        ensure_set_quantity(quantity)?;
        let mut cart = self.load().await?;
        cart.set_quantity(product_id, quantity);
        self.save(&cart).await
    }

    async fn remove(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut cart = self.load().await?;
        cart.remove(product_id);
        self.save(&cart).await
    }

    async fn items(&self) -> Result<Vec<CartItem>, CartError> {
        let cart = self.load().await?;
        resolve_items(&cart, &ProductRepository::new(self.pool)).await
    }

    async fn count(&self) -> Result<i64, CartError> {
        Ok(self.load().await?.total_count())
    }
}

// =============================================================================
// Row-backed store (authenticated)
// =============================================================================

/// Authenticated cart over persisted `cart_line` rows.
pub struct UserCartStore<'a> {
    pool: &'a PgPool,
    user_id: UserId,
}

impl<'a> UserCartStore<'a> {
    /// Create a store for the given user.
    #[must_use]
    pub const fn new(pool: &'a PgPool, user_id: UserId) -> Self {
        Self { pool, user_id }
    }
}

impl CartStore for UserCartStore<'_> {
    async fn add(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        ensure_add_quantity(quantity)?;
        let products = ProductRepository::new(self.pool);
        if products.get(product_id).await?.is_none() {
            return Err(CartError::ProductNotFound(product_id));
        }

        // Single upsert: concurrent adds from two tabs both land.
        CartRepository::new(self.pool)
            .add_quantity(self.user_id, product_id, quantity)
            .await?;
        Ok(())
    }

    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        ensure_set_quantity(quantity)?;
        let products = ProductRepository::new(self.pool);
        if products.get(product_id).await?.is_none() {
            return Err(CartError::ProductNotFound(product_id));
        }

        CartRepository::new(self.pool)
            .set_quantity(self.user_id, product_id, quantity)
            .await?;
        Ok(())
    }

    async fn remove(&self, product_id: ProductId) -> Result<(), CartError> {
        CartRepository::new(self.pool)
            .remove(self.user_id, product_id, Some("removed from cart"))
            .await?;
        Ok(())
    }

    async fn items(&self) -> Result<Vec<CartItem>, CartError> {
        Ok(CartRepository::new(self.pool).list(self.user_id).await?)
    }

    async fn count(&self) -> Result<i64, CartError> {
        Ok(CartRepository::new(self.pool)
            .total_count(self.user_id)
            .await?)
    }
}

// =============================================================================
// Reconciliation service
// =============================================================================

/// The cart service: one of the two stores, picked by identity, plus the
/// reconciliation step between them.
pub enum CartService<'a> {
    /// Anonymous: session-backed store.
    Anonymous(SessionCartStore<'a>),
    /// Authenticated: row-backed store, with the session still at hand for
    /// the merge step.
    Authenticated {
        /// The persisted store.
        store: UserCartStore<'a>,
        /// The session carrying any not-yet-merged anonymous cart.
        session: &'a Session,
        /// Pool for the merge's product lookups.
        pool: &'a PgPool,
    },
}

impl<'a> CartService<'a> {
    /// Build the service for an explicit identity.
    #[must_use]
    pub const fn new(pool: &'a PgPool, session: &'a Session, identity: CartIdentity) -> Self {
        match identity {
            CartIdentity::Anonymous => Self::Anonymous(SessionCartStore::new(session, pool)),
            CartIdentity::Authenticated(user_id) => Self::Authenticated {
                store: UserCartStore::new(pool, user_id),
                session,
                pool,
            },
        }
    }

    /// Merge the session cart into the persisted cart, then clear it.
    ///
    /// Invoked once, at the moment a session transitions from anonymous to
    /// authenticated (login or signup completion). Each session quantity is
    /// ADDED to whatever is already persisted for that product. Anonymous
    /// identity is a no-op guard against mis-invocation.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if a session entry references a
    /// product that no longer exists, and `CartError::InvalidQuantity` if an
    /// entry holds a quantity no line may take; entries already processed
    /// stay merged, and the session map is left in place so the next login
    /// retries.
    pub async fn merge_session_cart(&self) -> Result<(), CartError> {
        let Self::Authenticated {
            store,
            session,
            pool,
        } = self
        else {
            return Ok(());
        };

        let session_store = SessionCartStore::new(session, pool);
        let cart = session_store.load().await?;
        if cart.is_empty() {
            return Ok(());
        }

        struct PersistedLines<'a> {
            repo: CartRepository<'a>,
            user_id: UserId,
        }

        impl LineWriter for PersistedLines<'_> {
            async fn add_line(
                &mut self,
                product_id: ProductId,
                quantity: i64,
            ) -> Result<(), CartError> {
                self.repo
                    .add_quantity(self.user_id, product_id, quantity)
                    .await?;
                Ok(())
            }
        }

        let mut lines = PersistedLines {
            repo: CartRepository::new(pool),
            user_id: store.user_id,
        };
        merge_entries(&cart, &ProductRepository::new(pool), &mut lines).await?;

        // All entries merged; drop the anonymous cart.
        session_store.save(&SessionCart::new()).await
    }
}

impl CartStore for CartService<'_> {
    async fn add(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        match self {
            Self::Anonymous(store) => store.add(product_id, quantity).await,
            Self::Authenticated { store, .. } => store.add(product_id, quantity).await,
        }
    }

    async fn update(&self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        match self {
            Self::Anonymous(store) => store.update(product_id, quantity).await,
            Self::Authenticated { store, .. } => store.update(product_id, quantity).await,
        }
    }

    async fn remove(&self, product_id: ProductId) -> Result<(), CartError> {
        match self {
            Self::Anonymous(store) => store.remove(product_id).await,
            Self::Authenticated { store, .. } => store.remove(product_id).await,
        }
    }

    async fn items(&self) -> Result<Vec<CartItem>, CartError> {
        match self {
            Self::Anonymous(store) => store.items().await,
            Self::Authenticated { store, .. } => store.items().await,
        }
    }

    async fn count(&self) -> Result<i64, CartError> {
        match self {
            Self::Anonymous(store) => store.count().await,
            Self::Authenticated { store, .. } => store.count().await,
        }
    }
}

/// Identity for a request: authenticated when a user is in the session.
#[must_use]
pub fn identity_of(user: Option<&crate::models::CurrentUser>) -> CartIdentity {
    user.map_or(CartIdentity::Anonymous, |u| {
        CartIdentity::Authenticated(u.id)
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use crate::models::CurrentUser;

    use super::*;

    const P1: ProductId = ProductId::new(1);
    const P2: ProductId = ProductId::new(2);

    fn product(id: ProductId) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            description: String::new(),
            price: Some(Decimal::new(999, 2)),
            image_path: None,
            category: None,
            stock: Some(3),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct FakeCatalog(HashMap<ProductId, Product>);

    impl FakeCatalog {
        fn with(ids: &[ProductId]) -> Self {
            Self(ids.iter().map(|&id| (id, product(id))).collect())
        }
    }

    impl ProductLookup for FakeCatalog {
        async fn product(&self, id: ProductId) -> Result<Option<Product>, CartError> {
            Ok(self.0.get(&id).cloned())
        }
    }

    #[derive(Default)]
    struct RecordedLines(HashMap<ProductId, i64>);

    impl LineWriter for RecordedLines {
        async fn add_line(
            &mut self,
            product_id: ProductId,
            quantity: i64,
        ) -> Result<(), CartError> {
            *self.0.entry(product_id).or_insert(0) += quantity;
            Ok(())
        }
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(ensure_add_quantity(1).is_ok());
        assert!(ensure_add_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            ensure_add_quantity(0),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            ensure_add_quantity(-5_000_000_000),
            Err(CartError::InvalidQuantity(-5_000_000_000))
        ));
        assert!(matches!(
            ensure_add_quantity(MAX_LINE_QUANTITY + 1),
            Err(CartError::InvalidQuantity(_))
        ));

        assert!(ensure_set_quantity(0).is_ok());
        assert!(ensure_set_quantity(-3).is_ok());
        assert!(matches!(
            ensure_set_quantity(MAX_LINE_QUANTITY + 1),
            Err(CartError::InvalidQuantity(_))
        ));
    }

    #[tokio::test]
    async fn test_items_skip_missing_products() {
        let mut cart = SessionCart::new();
        cart.add(P1, 2);
        cart.add(P2, 1);

        let catalog = FakeCatalog::with(&[P1]);
        let items = resolve_items(&cart, &catalog).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, P1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_merge_writes_every_known_entry() {
        let mut cart = SessionCart::new();
        cart.add(P1, 2);
        cart.add(P2, 1);

        let catalog = FakeCatalog::with(&[P1, P2]);
        let mut lines = RecordedLines::default();
        merge_entries(&cart, &catalog, &mut lines).await.unwrap();

        assert_eq!(lines.0.get(&P1), Some(&2));
        assert_eq!(lines.0.get(&P2), Some(&1));
    }

    #[tokio::test]
    async fn test_merge_aborts_on_missing_product() {
        let mut cart = SessionCart::new();
        cart.add(P2, 4);

        let catalog = FakeCatalog::with(&[P1]);
        let mut lines = RecordedLines::default();
        let err = merge_entries(&cart, &catalog, &mut lines).await.unwrap_err();

        assert!(matches!(err, CartError::ProductNotFound(id) if id == P2));
        assert!(lines.0.is_empty());
    }

    #[tokio::test]
    async fn test_merge_rejects_out_of_range_entry() {
        // A session map written by an older build, or tampered with, can
        // carry a value the persisted column cannot take.
        let mut cart = SessionCart::new();
        cart.add(P1, -5_000_000_000);

        let catalog = FakeCatalog::with(&[P1]);
        let mut lines = RecordedLines::default();
        let err = merge_entries(&cart, &catalog, &mut lines).await.unwrap_err();

        assert!(matches!(err, CartError::InvalidQuantity(-5_000_000_000)));
        assert!(lines.0.is_empty());
    }

    #[test]
    fn test_identity_of() {
        assert_eq!(identity_of(None), CartIdentity::Anonymous);

        let user = CurrentUser {
            id: UserId::new(9),
            username: "alice".into(),
        };
        assert_eq!(
            identity_of(Some(&user)),
            CartIdentity::Authenticated(UserId::new(9))
        );
    }
}
