//! Domain model definitions.

pub mod cart;
pub mod checkout;
pub mod email;
pub mod gift;
pub mod invitee;
pub mod payment;
pub mod user;
pub mod wedding_list;

pub use cart::{CartItemView, CartView};
pub use checkout::{CheckoutState, ProviderReturnParams};
pub use email::MarketingEmailType;
pub use gift::{GiftSummary, PurchaseStatus};
pub use invitee::{InviteeStatus, InviteeView};
pub use payment::{MoneyBag, PaymentType};
pub use user::UserRole;
pub use wedding_list::WeddingList;
