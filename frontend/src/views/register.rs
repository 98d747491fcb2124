use leptos::prelude::*;
use myhome_shared::MIN_PASSWORD_LEN;

use crate::app::UiAction;
use crate::feedback::Feedback;
use crate::web::route::AppRoute;

#[component]
pub fn RegisterPage(actions: Callback<UiAction>, feedback: Feedback) -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        actions.run(UiAction::Register {
            email: email.get_untracked(),
            password: password.get_untracked(),
            confirm: confirm.get_untracked(),
        });
    };

    view! {
        <div class="auth-screen">
            <div class="auth-screen__header">
                <div class="auth-logo">
                    <div class="auth-logo__icon">"MH"</div>
                    <h1 class="auth-logo__title">"Create Account"</h1>
                </div>
                <p class="auth-screen__subtitle">"Start tracking what you own"</p>
            </div>
            <form class="auth-form" id="register-form" novalidate on:submit=on_submit>
                <div class="form-group">
                    <label class="form-label" for="register-email">"Email"</label>
                    <input
                        class=move || feedback.input_class("form-input", "register-email")
                        type="email"
                        id="register-email"
                        placeholder="your@email.com"
                        required
                        autocomplete="email"
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        prop:value=email
                    />
                </div>
                <div class="form-group">
                    <label class="form-label" for="register-password">"Password"</label>
                    <input
                        class=move || feedback.input_class("form-input", "register-password")
                        type="password"
                        id="register-password"
                        placeholder=format!("At least {MIN_PASSWORD_LEN} characters")
                        required
                        autocomplete="new-password"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                    />
                </div>
                <div class="form-group">
                    <label class="form-label" for="register-confirm">"Confirm Password"</label>
                    <input
                        class=move || feedback.input_class("form-input", "register-confirm")
                        type="password"
                        id="register-confirm"
                        placeholder="Repeat your password"
                        required
                        autocomplete="new-password"
                        on:input=move |ev| set_confirm.set(event_target_value(&ev))
                        prop:value=confirm
                    />
                </div>
                <button type="submit" class="btn btn--primary btn--full" id="register-submit">
                    "Create Account"
                </button>
                <div class="auth-form__footer">
                    <span class="auth-form__footer-text">"Already have an account?"</span>
                    <a href=format!("#{}", AppRoute::Login.to_path()) class="auth-form__link">
                        "Login"
                    </a>
                </div>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::render_html;
    use crate::views::login::LoginPage;
    use crate::web::dom::LazyView;

    fn actions() -> Callback<UiAction> {
        Callback::new(|_: UiAction| {})
    }

    #[test]
    fn test_auth_forms_link_to_each_other() {
        let feedback = Feedback::default();
        let register = render_html(LazyView::new(move || {
            view! { <RegisterPage actions=actions() feedback=feedback /> }
        }));
        let login = render_html(LazyView::new(move || {
            view! { <LoginPage actions=actions() feedback=feedback /> }
        }));
        assert!(register.contains(r##"href="#/login""##));
        assert!(login.contains(r##"href="#/register""##));
    }
}
