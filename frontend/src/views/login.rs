use leptos::prelude::*;

use crate::app::UiAction;
use crate::feedback::Feedback;
use crate::web::route::AppRoute;

#[component]
pub fn LoginPage(actions: Callback<UiAction>, feedback: Feedback) -> impl IntoView {
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        actions.run(UiAction::Login {
            email: email.get_untracked(),
            password: password.get_untracked(),
        });
    };

    view! {
        <div class="auth-screen">
            <div class="auth-screen__header">
                <div class="auth-logo">
                    <div class="auth-logo__icon">"MH"</div>
                    <h1 class="auth-logo__title">"MyHome"</h1>
                </div>
                <p class="auth-screen__subtitle">"Manage your home inventory"</p>
            </div>
            <form class="auth-form" id="login-form" novalidate on:submit=on_submit>
                <div class="form-group">
                    <label class="form-label" for="login-email">"Email"</label>
                    <input
                        class=move || feedback.input_class("form-input", "login-email")
                        type="email"
                        id="login-email"
                        placeholder="your@email.com"
                        required
                        autocomplete="email"
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        prop:value=email
                    />
                </div>
                <div class="form-group">
                    <label class="form-label" for="login-password">"Password"</label>
                    <input
                        class=move || feedback.input_class("form-input", "login-password")
                        type="password"
                        id="login-password"
                        placeholder="••••••••"
                        required
                        autocomplete="current-password"
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        prop:value=password
                    />
                </div>
                <button type="submit" class="btn btn--primary btn--full" id="login-submit">
                    "Login"
                </button>
                <div class="auth-form__footer">
                    <span class="auth-form__footer-text">"Don't have an account?"</span>
                    <a href=format!("#{}", AppRoute::Register.to_path()) class="auth-form__link">
                        "Create account"
                    </a>
                </div>
            </form>
        </div>
    }
}
