//! User-facing message catalogue
//!
//! All strings shown to the user live here so the wording stays consistent
//! between the engine, the rule library and the account screens.

/// Field rule failed without giving a reason
pub const VALIDATION_FAILED: &str = "验证失败";
/// A validator faulted instead of answering
pub const VALIDATION_ERRORED: &str = "验证过程出错";
pub const FORM_VALIDATION_FAILED: &str = "表单验证失败";
pub const FORM_VALIDATION_ERRORED: &str = "表单验证出错";
pub const SUBMIT_FAILED: &str = "提交失败";

pub const DEFAULT_FIELD_LABEL: &str = "此项";
pub const DEFAULT_LENGTH_LABEL: &str = "内容";
pub const DEFAULT_RANGE_LABEL: &str = "数值";
pub const INVALID_FORMAT: &str = "格式不正确";

pub const EMAIL_REQUIRED: &str = "请输入邮箱地址";
pub const EMAIL_INVALID: &str = "请输入有效的邮箱地址";
pub const EMAIL_EXISTS: &str = "该邮箱已被注册，请直接登录";

pub const PASSWORD_REQUIRED: &str = "请输入密码";
pub const PASSWORD_WEAK_HINT: &str = "建议密码包含字母和数字以提高安全性";
pub const PASSWORD_CONFIRM_REQUIRED: &str = "请再次输入密码";
pub const PASSWORD_MISMATCH: &str = "两次输入的密码不一致";

pub const NAME_REQUIRED: &str = "请输入昵称";
pub const NAME_INVALID: &str = "昵称只能包含中文、字母、数字和下划线";

pub const PHONE_REQUIRED: &str = "请输入手机号码";
pub const PHONE_INVALID: &str = "请输入有效的手机号码";

pub const URL_REQUIRED: &str = "请输入 URL 地址";
pub const URL_INVALID: &str = "请输入有效的 URL 地址";

pub const LOGIN_FAILED: &str = "邮箱或密码不正确";
pub const LOGIN_SUCCESS: &str = "登录成功";
pub const REGISTER_SUCCESS: &str = "注册成功";
pub const PROCESSING: &str = "处理中...";
pub const UNKNOWN_ERROR: &str = "发生了未知错误";

pub fn required(label: &str) -> String {
    format!("{label}为必填项")
}

pub fn password_too_short(min: usize) -> String {
    format!("密码至少需要 {min} 位字符")
}

pub fn password_too_long(max: usize) -> String {
    format!("密码最多 {max} 位字符")
}

pub fn name_too_short(min: usize) -> String {
    format!("昵称至少需要 {min} 个字符")
}

pub fn name_too_long(max: usize) -> String {
    format!("昵称最多 {max} 个字符")
}

pub fn too_short(label: &str, min: usize) -> String {
    format!("{label}至少需要 {min} 个字符")
}

pub fn too_long(label: &str, max: usize) -> String {
    format!("{label}最多 {max} 个字符")
}

pub fn not_a_number(label: &str) -> String {
    format!("请输入有效的{label}")
}

pub fn below_min(label: &str, min: f64) -> String {
    format!("{label}不能小于 {min}")
}

pub fn above_max(label: &str, max: f64) -> String {
    format!("{label}不能大于 {max}")
}

/// Text of an error for display, falling back to a generic message
pub fn error_message(err: &anyhow::Error) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        text
    }
}
