//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod cart;
pub mod gift;
pub mod gift_purchase;
pub mod invitee;
pub mod money_bag;
pub mod user;
pub mod wedding_list;

pub use cart::{CartEntity, CartItemEntity, CartItemWithGiftEntity};
pub use gift::GiftEntity;
pub use gift_purchase::{GiftPurchaseEntity, PurchaseStatusDb};
pub use invitee::{InviteeEntity, InviteeStatusDb};
pub use money_bag::{MoneyBagEntity, PaymentProviderDb};
pub use user::{UserEntity, UserRoleDb};
pub use wedding_list::WeddingListEntity;
