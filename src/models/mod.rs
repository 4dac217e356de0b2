pub mod admin;
pub mod enquiry;
pub mod product;

pub use admin::{AdminCredential, OtpSnapshot};
pub use enquiry::{
    CreateEnquiryRequest, CreatedEnquiry, Enquiry, EnquiryStatus, EnquiryWithProduct, NewEnquiry,
    UpdateEnquiryRequest,
};
pub use product::ProductRef;
