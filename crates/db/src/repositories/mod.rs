//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod booking;
pub mod error;
pub mod hold;
pub mod member;
pub mod out_of_order;
pub mod reservation;
pub mod voucher;

mod mapping;
mod queries;

pub use booking::BookingRepository;
pub use error::{CLAIMS_UNIQUE_INDEX, RepositoryError};
pub use hold::HoldRepository;
pub use member::{MemberLedger, MemberRepository};
pub use out_of_order::{OutOfOrderReport, OutOfOrderRepository};
pub use reservation::ReservationRepository;
pub use voucher::VoucherRepository;
