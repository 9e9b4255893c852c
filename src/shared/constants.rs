// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// General managing director - unrestricted access to clients and files
pub const ROLE_GMD: &str = "gmd";

/// Chairman - unrestricted access to clients and files
pub const ROLE_CHAIRMAN: &str = "chairman";

/// Roles granted unrestricted visibility when `PRIVILEGED_ROLES` is not set
pub const DEFAULT_PRIVILEGED_ROLES: &[&str] = &[ROLE_GMD, ROLE_CHAIRMAN];

// =============================================================================
// UPLOADS
// =============================================================================

/// Default maximum upload size in bytes (10MB)
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Content type recorded when neither the part nor the filename tells us better
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
