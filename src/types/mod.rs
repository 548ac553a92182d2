pub mod identifiers;
pub mod verdict;

pub use identifiers::{IdentityError, ResourceIdentity, FINGERPRINT_LEN};
pub use verdict::ChangeVerdict;
