//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe string ID wrappers that
//! prevent accidentally mixing IDs from different entity types.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use solestyle_core::define_id;
/// define_id!(SkuId);
/// define_id!(WarehouseId);
///
/// let sku = SkuId::new("sku-1");
/// let warehouse = WarehouseId::new("sku-1");
///
/// // These are different types, so this won't compile:
/// // let _: SkuId = warehouse;
/// assert_eq!(sku.as_str(), warehouse.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);

impl ProductId {
    /// Derive a product ID from a product page link (`air-max.html` -> `air-max`).
    ///
    /// Only the last path segment is used, so `/men/air-max.html` also yields
    /// `air-max`.
    #[must_use]
    pub fn from_product_link(link: &str) -> Self {
        let file = link.rsplit('/').next().unwrap_or(link);
        Self(file.strip_suffix(".html").unwrap_or(file).to_owned())
    }

    /// Derive a product ID from a display name when the page carries no ID.
    ///
    /// Lower-cases the name and replaces each run of whitespace with `-`,
    /// including runs at either end (`" Runner "` -> `-runner-`).
    #[must_use]
    pub fn from_product_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut in_whitespace = false;
        for c in name.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    slug.push('-');
                }
                in_whitespace = true;
            } else {
                slug.extend(c.to_lowercase());
                in_whitespace = false;
            }
        }
        Self(slug)
    }
}

impl OrderId {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "SS";

    /// Upper bound (exclusive) of the random suffix.
    pub const SUFFIX_RANGE: u32 = 1000;

    /// Generate an order number of the form `SS-<epoch-seconds>-<0..=999>`.
    ///
    /// Uniqueness is probabilistic only; two orders placed in the same second
    /// collide with a chance of one in a thousand. See
    /// [`OrderId::generate_unique`] for a collision-checked variant.
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix = rng.random_range(0..Self::SUFFIX_RANGE);
        Self(format!("{}-{}-{suffix}", Self::PREFIX, now.timestamp()))
    }

    /// Generate an order number that `taken` reports as unused.
    ///
    /// Gives up after `attempts` draws and returns `None`.
    pub fn generate_unique<R, F>(
        now: DateTime<Utc>,
        rng: &mut R,
        attempts: usize,
        mut taken: F,
    ) -> Option<Self>
    where
        R: Rng + ?Sized,
        F: FnMut(&Self) -> bool,
    {
        (0..attempts)
            .map(|_| Self::generate(now, rng))
            .find(|id| !taken(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_product_id_from_link() {
        assert_eq!(ProductId::from_product_link("air-max.html").as_str(), "air-max");
        assert_eq!(
            ProductId::from_product_link("/men/trail-runner.html").as_str(),
            "trail-runner"
        );
        assert_eq!(ProductId::from_product_link("no-suffix").as_str(), "no-suffix");
    }

    #[test]
    fn test_product_id_from_name() {
        assert_eq!(
            ProductId::from_product_name("Classic  Leather Boot").as_str(),
            "classic-leather-boot"
        );
        assert_eq!(ProductId::from_product_name(" Runner ").as_str(), "-runner-");
        assert_eq!(
            ProductId::from_product_name("\n  Trail\tRunner\n").as_str(),
            "-trail-runner-"
        );
    }

    #[test]
    fn test_order_id_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let id = OrderId::generate(now, &mut rng);
            let parts: Vec<&str> = id.as_str().split('-').collect();
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], "SS");
            assert_eq!(parts[1], now.timestamp().to_string());
            let suffix: u32 = parts[2].parse().unwrap();
            assert!(suffix < 1000);
        }
    }

    #[test]
    fn test_generate_unique_skips_taken_ids() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let first = OrderId::generate(now, &mut rng);

        let mut rng = StdRng::seed_from_u64(1);
        let id = OrderId::generate_unique(now, &mut rng, 50, |candidate| candidate == &first)
            .unwrap();
        assert_ne!(id, first);
    }

    #[test]
    fn test_generate_unique_gives_up() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(OrderId::generate_unique(now, &mut rng, 5, |_| true).is_none());
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = ProductId::new("air-max");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"air-max\"");
    }
}
