pub mod credentials;
pub mod enquiry;
pub mod mailer;
pub mod otp;

pub use credentials::CredentialService;
pub use enquiry::EnquiryService;
pub use mailer::Mailer;
pub use otp::{issue_decision, verify_decision, IssueDecision, OtpService, VerifyDecision};
