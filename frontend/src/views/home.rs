use leptos::prelude::*;
use myhome_shared::Item;

use super::EmptyState;
use super::item_card::ItemGrid;
use crate::app::UiAction;
use crate::web::route::AppRoute;

/// 首页最多展示的最近物品数
pub const MAX_RECENT: usize = 4;

fn count_label(total: usize) -> String {
    if total == 1 {
        "1 item".to_string()
    } else {
        format!("{total} items")
    }
}

/// `items` 按添加时间倒序
#[component]
pub fn HomePage(items: Vec<Item>, actions: Callback<UiAction>) -> impl IntoView {
    let total = items.len();
    let content = if total == 0 {
        view! {
            <EmptyState
                title="No items yet"
                text="Start by adding your first item. Tap the + button to begin."
            />
        }
        .into_any()
    } else {
        let recent: Vec<Item> = items.into_iter().take(MAX_RECENT).collect();
        view! {
            <div class="section-header">
                <span class="section-header__title">"Recently Added"</span>
                <span class="section-header__count">{count_label(total)}</span>
            </div>
            <ItemGrid items=recent />
            {(total > MAX_RECENT).then(move || view! {
                <div class="home__view-all">
                    <button
                        class="btn btn--ghost btn--sm"
                        on:click=move |_| actions.run(UiAction::Navigate(AppRoute::Items))
                    >
                        {format!("View all {total} items")}
                    </button>
                </div>
            })}
        }
        .into_any()
    };

    view! {
        {content}
        <button
            class="fab"
            id="fab-add"
            aria-label="Add item"
            on:click=move |_| actions.run(UiAction::Navigate(AppRoute::AddItem))
        >
            <svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round">
                <line x1="12" y1="5" x2="12" y2="19" />
                <line x1="5" y1="12" x2="19" y2="12" />
            </svg>
        </button>
    }
}
