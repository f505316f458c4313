pub mod about;
pub mod account;
pub mod announcement;
pub mod banner;
pub mod common;
pub mod donation;
pub mod donation_category;
pub mod error;
pub mod event;
pub mod gallery;
pub mod kajian;
pub mod memory;
pub mod repository;
pub mod session;

pub use about::AboutRepository;
pub use account::{AccountStore, PgAccountStore};
pub use announcement::AnnouncementRepository;
pub use banner::BannerRepository;
pub use donation::DonationRepository;
pub use donation_category::DonationCategoryRepository;
pub use error::StorageError;
pub use event::EventRepository;
pub use gallery::GalleryRepository;
pub use kajian::KajianRepository;
pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use repository::Repository;
pub use session::{PgSessionStore, SessionStore};
