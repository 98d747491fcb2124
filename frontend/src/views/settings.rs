use leptos::prelude::*;
use myhome_shared::User;

use crate::app::UiAction;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[component]
pub fn SettingsPage(user: Option<User>, actions: Callback<UiAction>) -> impl IntoView {
    view! {
        <div class="settings">
            <div class="settings__section">
                <h3 class="settings__section-title">"账户"</h3>
                {user.map(|u| view! {
                    <div class="settings__item">
                        <span class="settings__item-label">"邮箱"</span>
                        <span class="settings__item-value">{u.email}</span>
                    </div>
                })}
                <button
                    class="settings__button settings__button--danger"
                    id="logout-btn"
                    on:click=move |_| actions.run(UiAction::Logout)
                >
                    <span>"退出登录"</span>
                </button>
            </div>
            <div class="settings__section">
                <h3 class="settings__section-title">"关于"</h3>
                <div class="settings__item">
                    <span class="settings__item-label">"版本"</span>
                    <span class="settings__item-value">{APP_VERSION}</span>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::render_html;
    use crate::web::dom::LazyView;

    fn render(user: Option<User>) -> String {
        let actions = Callback::new(|_: UiAction| {});
        render_html(LazyView::new(move || view! { <SettingsPage user=user actions=actions /> }))
    }

    #[test]
    fn test_shows_account_email() {
        let user = User {
            id: "u1".into(),
            email: "a@b.co".into(),
            name: None,
            created_at: None,
        };
        let html = render(Some(user));
        assert!(html.contains("a@b.co"));
        assert!(html.contains(r#"id="logout-btn""#));
        assert!(html.contains(APP_VERSION));
        assert!(!render(None).contains("邮箱"));
    }
}
