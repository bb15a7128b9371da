// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 注意: 冲突消息按显式 locale 渲染,不依赖全局语言设置
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 已加载的语言列表
pub fn available_locales() -> Vec<String> {
    rust_i18n::available_locales!()
        .into_iter()
        .map(|l| l.to_string())
        .collect()
}

/// 翻译消息（无参数,使用全局语言）
///
/// # 示例
/// ```no_run
/// use training_mgmt::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数,使用全局语言）
///
/// # 示例
/// ```no_run
/// use training_mgmt::i18n::t_with_args;
/// let msg = t_with_args("api.not_found", &[("what", "training T1")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    interpolate(rust_i18n::t!(key).to_string(), args)
}

/// 翻译消息（无参数,指定语言）
///
/// # 示例
/// ```no_run
/// use training_mgmt::i18n::t_locale;
/// let msg = t_locale("conflict.schedule_overlap", "en");
/// ```
pub fn t_locale(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（带参数,指定语言）
pub fn t_locale_with_args(key: &str, locale: &str, args: &[(&str, &str)]) -> String {
    interpolate(rust_i18n::t!(key, locale = locale).to_string(), args)
}

/// 替换 %{name} 占位符
fn interpolate(mut result: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
