// Shared user-facing message strings.
// Kept in one place so services and tests agree on exact wording.

pub const USER_NOT_FOUND: &str = "User doesn't exist!";
pub const USER_NOT_CREATED: &str = "You have not created a user profile yet!";
pub const ADMIN_NOT_CREATED: &str = "You have not created an admin yet!";
pub const INCORRECT_CREDENTIALS: &str = "Incorrect email or password!";
pub const ACCOUNT_INACTIVE: &str = "Account is inactive!";
pub const INVALID_TOKEN: &str = "Invalid credentials!";
pub const ACCESS_TOKEN_EXPIRED: &str = "Access token expired! Please login again.";
pub const REFRESH_TOKEN_EXPIRED: &str = "Refresh token expired! Please login again.";
pub const RESET_TOKEN_EXPIRED: &str = "Reset token expired! Generate a new otp.";
pub const INVALID_OTP: &str = "Invalid otp!";
pub const EXPIRED_OTP: &str = "Otp expired! Generate a new otp.";
pub const GIT_EMAIL_NOT_FOUND: &str = "User email not found in git account!";
pub const NO_PERMISSION: &str = "You don't have permission!";
pub const ADMIN_NOT_ALLOWED: &str = "Admin user can't perform this action!";
pub const SELF_FOLLOW: &str = "A user cannot follow themselves!";
pub const ACCEPT_WITHOUT_REQUEST: &str = "No pending follow request to accept!";
pub const REJECT_WITHOUT_REQUEST: &str = "No pending follow request to reject!";
pub const POST_NOT_FOUND: &str = "Post not found!";
pub const COMMENT_NOT_FOUND: &str = "Comment not found!";
pub const PRIVATE_USER: &str =
    "This is a private user. You must follow them to access their contents.";
pub const SUBSCRIPTION_ALREADY_CREATED: &str = "Subscription already created!";
pub const USER_NOT_SUBSCRIBED: &str = "User is not subscribed!";
pub const TRANSACTION_NOT_CREATED: &str = "Transaction doesn't exist for this payment!";
