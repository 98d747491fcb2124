//! 界面反馈
//!
//! 操作结果（提示框、字段高亮、邀请码校验）写入 [`Feedback`] 中的信号，
//! 视图和 [`FeedbackLayer`] 订阅这些信号。

use std::time::Duration;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

const TOAST_MS: u64 = 2500;
const FIELD_ERROR_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn class(self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast--visible",
            ToastKind::Error => "toast toast--error toast--visible",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

/// 需要高亮的输入框（元素 id）
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// 邀请码输入框下方的校验状态
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CodeCheck {
    /// 尚未输入完整，不显示结果
    #[default]
    Incomplete,
    Found(String),
    Invalid,
    Failed(String),
}

impl CodeCheck {
    /// 只有找到家庭时才允许加入
    pub fn join_ready(&self) -> bool {
        matches!(self, CodeCheck::Found(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Feedback {
    pub toast: RwSignal<Option<Toast>>,
    pub field_error: RwSignal<Option<FieldError>>,
    pub code_check: RwSignal<CodeCheck>,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            toast: RwSignal::new(None),
            field_error: RwSignal::new(None),
            code_check: RwSignal::new(CodeCheck::default()),
        }
    }
}

impl Feedback {
    pub fn show(&self, toast: Option<Toast>, field_error: Option<FieldError>) {
        if toast.is_some() {
            self.toast.set(toast);
        }
        if field_error.is_some() {
            self.field_error.set(field_error);
        }
    }

    /// 输入框的 class，`id` 是当前被标记的字段时追加错误样式
    pub fn input_class(&self, base: &str, id: &str) -> String {
        let flagged = self
            .field_error
            .with(|f| f.as_ref().is_some_and(|f| f.field == id));
        if flagged {
            format!("{base} form-input--error")
        } else {
            base.to_string()
        }
    }
}

/// 全局提示框，挂载在 `<body>` 下，并负责定时清除提示与字段高亮
#[component]
pub fn FeedbackLayer(feedback: Feedback) -> impl IntoView {
    let toast = feedback.toast;
    let field_error = feedback.field_error;

    // 定时清除提示
    Effect::new(move |_| {
        if toast.get().is_some() {
            set_timeout(move || toast.set(None), Duration::from_millis(TOAST_MS));
        }
    });

    // 聚焦出错的输入框，稍后取消高亮
    Effect::new(move |_| {
        let Some(field) = field_error.get() else {
            return;
        };
        if let Some(input) = document()
            .get_element_by_id(&field.field)
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        {
            let _ = input.focus();
        }
        set_timeout(
            move || field_error.set(None),
            Duration::from_millis(FIELD_ERROR_MS),
        );
    });

    view! {
        {move || {
            toast.get().map(|t| view! { <div class=t.kind.class()>{t.message}</div> })
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_class_flags_only_the_marked_field() {
        let feedback = Feedback::default();
        assert_eq!(feedback.input_class("form-input", "login-email"), "form-input");

        feedback.show(
            None,
            Some(FieldError {
                field: "login-email".into(),
                message: "Email is required".into(),
            }),
        );
        assert_eq!(
            feedback.input_class("form-input", "login-email"),
            "form-input form-input--error"
        );
        assert_eq!(feedback.input_class("form-input", "login-password"), "form-input");
    }

    #[test]
    fn test_show_keeps_previous_toast_when_none_given() {
        let feedback = Feedback::default();
        let toast = Toast {
            message: "已退出登录".into(),
            kind: ToastKind::Success,
        };
        feedback.show(Some(toast.clone()), None);
        feedback.show(None, None);
        assert_eq!(feedback.toast.get_untracked(), Some(toast));
        assert_eq!(ToastKind::Error.class(), "toast toast--error toast--visible");
    }

    #[test]
    fn test_only_found_code_enables_join() {
        assert!(CodeCheck::Found("家".into()).join_ready());
        assert!(!CodeCheck::Invalid.join_ready());
        assert!(!CodeCheck::Failed("offline".into()).join_ready());
        assert!(!CodeCheck::Incomplete.join_ready());
    }
}
