pub mod current_user;
pub mod fixer;
pub mod job_offer;

pub use current_user::CurrentUserRow;
pub use fixer::{
    AdditionalInfo, FixerProfileData, FixerRecord, FixerUser, GeoPoint, PaymentMethodEntry,
    ServiceEntry,
};
pub use job_offer::{JobLocation, JobOffer, STATUS_CANCELLED, STATUS_COMPLETED};
