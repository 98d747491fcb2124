use leptos::prelude::*;
use myhome_shared::Item;

use super::EmptyState;
use super::item_card::Thumbnail;
use crate::app::UiAction;
use crate::inventory::{ALL_ROOMS, filter_by_room, rooms};

#[component]
fn FilterChips(rooms: Vec<String>, active: String, actions: Callback<UiAction>) -> impl IntoView {
    view! {
        <div class="filter-chips">
            {rooms
                .into_iter()
                .map(|room| {
                    let class = if room == active {
                        "filter-chip filter-chip--active"
                    } else {
                        "filter-chip"
                    };
                    let selected = room.clone();
                    let data_room = room.clone();
                    view! {
                        <button
                            class=class
                            data-room=data_room
                            on:click=move |_| actions.run(UiAction::FilterRoom(selected.clone()))
                        >
                            {room}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
fn ListRow(item: Item, actions: Callback<UiAction>) -> impl IntoView {
    let Item {
        id,
        name,
        room,
        category,
        image,
        ..
    } = item;
    let detail = match category {
        Some(category) => format!("{room} · {category}"),
        None => room,
    };
    let label = format!("Delete {name}");
    let (target_id, target_name) = (id.clone(), name.clone());
    let on_delete = move |_| {
        let confirmed = window()
            .confirm_with_message(&format!("确定删除 \"{target_name}\" 吗？"))
            .unwrap_or(false);
        if confirmed {
            actions.run(UiAction::DeleteItem {
                id: target_id.clone(),
                name: target_name.clone(),
            });
        }
    };

    view! {
        <div class="items-list-item" data-id=id>
            <div class="items-list-item__thumb">
                <Thumbnail image=image name=name.clone() class="items-list-item__image" />
            </div>
            <div class="items-list-item__info">
                <div class="items-list-item__name">{name}</div>
                <div class="items-list-item__room">{detail}</div>
            </div>
            <div class="items-list-item__actions">
                <button
                    class="items-list-item__btn items-list-item__btn--delete"
                    aria-label=label
                    on:click=on_delete
                >
                    <svg width="18" height="18" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
                        <polyline points="3 6 5 6 21 6" />
                        <path d="M19 6v14a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V6m3 0V4a2 2 0 0 1 2-2h4a2 2 0 0 1 2 2v2" />
                    </svg>
                </button>
            </div>
        </div>
    }
}

/// 物品列表，`active_room` 不在当前房间列表中时回退为全部
#[component]
pub fn ItemsPage(items: Vec<Item>, active_room: String, actions: Callback<UiAction>) -> impl IntoView {
    if items.is_empty() {
        return view! { <EmptyState title="No items yet" text="Items you add will appear here." /> }
            .into_any();
    }

    let rooms = rooms(&items);
    let active = if rooms.contains(&active_room) {
        active_room
    } else {
        ALL_ROOMS.to_string()
    };
    let filtered: Vec<Item> = filter_by_room(&items, &active).into_iter().cloned().collect();
    let title = if active == ALL_ROOMS {
        "All Items".to_string()
    } else {
        active.clone()
    };
    let count = filtered.len().to_string();

    view! {
        <FilterChips rooms=rooms active=active actions=actions />
        <div class="section-header">
            <span class="section-header__title">{title}</span>
            <span class="section-header__count">{count}</span>
        </div>
        <div class="items-list" id="items-list">
            {filtered
                .into_iter()
                .map(|item| view! { <ListRow item=item actions=actions /> })
                .collect_view()}
        </div>
    }
    .into_any()
}
