//! Repository layer for database access.

pub mod cart;
pub mod gift;
pub mod gift_purchase;
pub mod invitee;
pub mod money_bag;
pub mod user;
pub mod wedding_list;

pub use cart::CartRepository;
pub use gift::GiftRepository;
pub use gift_purchase::GiftPurchaseRepository;
pub use invitee::InviteeRepository;
pub use money_bag::MoneyBagRepository;
pub use user::UserRepository;
pub use wedding_list::WeddingListRepository;
