//! 视图层
//!
//! 每个页面都是一个 leptos 组件，由路由处理器以 [`LazyView`](crate::web::dom::LazyView)
//! 的形式交给 `#view` 挂载。交互通过 `on:` 事件把 [`UiAction`] 交给 `actions` 回调；
//! 用户提供的文本由 leptos 负责转义。

use leptos::prelude::*;

use crate::app::UiAction;

pub mod add_item;
pub mod family;
pub mod home;
pub mod item_card;
pub mod items;
pub mod login;
pub mod register;
pub mod settings;

#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="view-loading">
            <span class="view-loading__text">"加载中..."</span>
        </div>
    }
}

#[component]
pub fn ErrorState(message: String, actions: Callback<UiAction>) -> impl IntoView {
    view! {
        <div class="view-error">
            <span class="view-error__text">{format!("加载失败：{message}")}</span>
            <button class="btn btn--ghost btn--sm" on:click=move |_| actions.run(UiAction::Retry)>
                "重试"
            </button>
        </div>
    }
}

/// 空列表占位
#[component]
pub(crate) fn EmptyState(title: &'static str, text: &'static str) -> impl IntoView {
    view! {
        <div class="empty-state">
            <div class="empty-state__icon">
                <svg width="40" height="40" viewBox="0 0 24 24" fill="none" stroke="#4F46E5" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round">
                    <path d="M3 9l9-7 9 7v11a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2z" />
                    <polyline points="9 22 9 12 15 12 15 22" />
                </svg>
            </div>
            <h2 class="empty-state__title">{title}</h2>
            <p class="empty-state__text">{text}</p>
        </div>
    }
}
