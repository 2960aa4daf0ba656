use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

/// Cached resource class. Each class owns a key prefix and a TTL.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CacheResource {
    /// Paged browse results
    Listings,
    /// Single listing lookup
    Listing,
    ProductDetail,
    Variants,
    FlashSales,
    Featured,
    Brands,
    Categories,
    Stats,
}

impl CacheResource {
    pub fn prefix(self) -> &'static str {
        match self {
            CacheResource::Listings => "sneakers",
            CacheResource::Listing => "sneaker",
            CacheResource::ProductDetail => "product",
            CacheResource::Variants => "variants",
            CacheResource::FlashSales => "flash_sales",
            CacheResource::Featured => "featured",
            CacheResource::Brands => "brands",
            CacheResource::Categories => "categories",
            CacheResource::Stats => "stats",
        }
    }

    /// Resolve a class from its snake_case name or its key prefix.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name)
            .ok()
            .or_else(|| Self::iter().find(|resource| resource.prefix() == name))
    }

    /// Glob patterns covering every key of this class.
    ///
    /// The bare prefix is listed separately since `prefix:*` does not match it.
    pub fn invalidation_patterns(self) -> [String; 2] {
        let prefix = self.prefix();
        [prefix.to_string(), format!("{}:*", prefix)]
    }
}

/// Time-to-live per resource class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub listing: Duration,
    pub detail: Duration,
    pub variants: Duration,
    pub flash_sales: Duration,
    pub featured: Duration,
    /// Brand and category enumerations
    pub enumeration: Duration,
    pub stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            listing: Duration::from_secs(300),
            detail: Duration::from_secs(600),
            variants: Duration::from_secs(300),
            flash_sales: Duration::from_secs(120),
            featured: Duration::from_secs(600),
            enumeration: Duration::from_secs(3600),
            stats: Duration::from_secs(300),
        }
    }
}

impl CacheTtls {
    pub fn for_resource(&self, resource: CacheResource) -> Duration {
        match resource {
            CacheResource::Listings | CacheResource::Listing => self.listing,
            CacheResource::ProductDetail => self.detail,
            CacheResource::Variants => self.variants,
            CacheResource::FlashSales => self.flash_sales,
            CacheResource::Featured => self.featured,
            CacheResource::Brands | CacheResource::Categories => self.enumeration,
            CacheResource::Stats => self.stats,
        }
    }
}
