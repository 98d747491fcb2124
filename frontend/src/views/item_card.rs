use leptos::prelude::*;
use myhome_shared::Item;

#[component]
fn PlaceholderIcon() -> impl IntoView {
    view! {
        <svg width="48" height="48" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round">
            <rect x="3" y="3" width="18" height="18" rx="2" ry="2" />
            <circle cx="8.5" cy="8.5" r="1.5" />
            <polyline points="21 15 16 10 5 21" />
        </svg>
    }
}

/// 图片或占位图标
#[component]
pub fn Thumbnail(image: String, name: String, class: &'static str) -> impl IntoView {
    if image.is_empty() {
        view! {
            <div class=format!("{class} {class}--placeholder")>
                <PlaceholderIcon />
            </div>
        }
        .into_any()
    } else {
        view! { <img class=class src=image alt=name loading="lazy" /> }.into_any()
    }
}

#[component]
pub fn ItemCard(item: Item) -> impl IntoView {
    view! {
        <article class="item-card" data-id=item.id>
            <Thumbnail image=item.image name=item.name.clone() class="item-card__image" />
            <div class="item-card__body">
                <div class="item-card__name">{item.name}</div>
                <span class="item-card__room">{item.room}</span>
            </div>
        </article>
    }
}

#[component]
pub fn ItemGrid(items: Vec<Item>) -> impl IntoView {
    (!items.is_empty()).then(|| {
        view! {
            <div class="items-grid">
                {items.into_iter().map(|item| view! { <ItemCard item=item /> }).collect_view()}
            </div>
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::render_html;
    use crate::web::dom::LazyView;
    use chrono::Utc;

    fn item(name: &str, image: &str) -> Item {
        Item {
            id: "id-1".into(),
            name: name.into(),
            room: "Kitchen".into(),
            category: None,
            notes: String::new(),
            image: image.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_text_is_escaped() {
        let hostile = item(r#"<img src=x onerror="alert(1)">"#, "");
        let html = render_html(LazyView::new(move || view! { <ItemCard item=hostile /> }));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x"));
        assert!(html.contains("item-card__image--placeholder"));
    }

    #[test]
    fn test_image_is_shown_when_present() {
        let lamp = item("Lamp", "data:image/png;base64,AAAA");
        let html = render_html(LazyView::new(move || view! { <ItemCard item=lamp /> }));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(html.contains(r#"alt="Lamp""#));
    }
}
