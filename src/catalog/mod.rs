mod accessor;
mod persistence;

pub use accessor::FoodCatalog;
pub use persistence::{
    load_catalog, load_custom_shares, load_policy, save_catalog, save_day_plan, save_policy,
};
