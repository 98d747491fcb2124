use leptos::prelude::*;
use myhome_shared::{FamilyHome, Member, Role};

use crate::app::UiAction;
use crate::family::{INVITE_CODE_FIELD, format_invite_code};
use crate::feedback::{CodeCheck, Feedback};

#[component]
fn MemberRow(member: Member) -> impl IntoView {
    let initial = member
        .email
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string());
    let (avatar, badge_class, badge) = match member.role {
        Role::Owner => (
            "family__member-avatar",
            "family__member-badge family__member-badge--owner",
            "创建者",
        ),
        Role::Member => (
            "family__member-avatar family__member-avatar--member",
            "family__member-badge family__member-badge--member",
            "成员",
        ),
    };
    view! {
        <div class="family__member">
            <div class=avatar>{initial}</div>
            <div class="family__member-info">
                <span class="family__member-name">{member.email}</span>
                <span class=badge_class>{badge}</span>
            </div>
        </div>
    }
}

#[component]
fn InviteSection(code: Option<String>, is_owner: bool, actions: Callback<UiAction>) -> impl IntoView {
    let generate = move |_| actions.run(UiAction::GenerateInviteCode);
    let body = match (code, is_owner) {
        (Some(code), true) => view! {
            <div class="family__code-display">
                <span class="family__code-text" id="invite-code-text">{code}</span>
                <button
                    class="family__invite-btn family__invite-btn--ghost"
                    id="generate-code-btn"
                    on:click=generate
                >
                    "重新生成"
                </button>
            </div>
        }
        .into_any(),
        (Some(code), false) => view! {
            <div class="family__code-display">
                <span class="family__code-text" id="invite-code-text">{code}</span>
            </div>
        }
        .into_any(),
        (None, true) => view! {
            <button class="family__invite-btn" id="generate-code-btn" on:click=generate>
                <span>"生成邀请码"</span>
            </button>
        }
        .into_any(),
        (None, false) => {
            view! { <p class="family__description">"创建者还没有生成邀请码。"</p> }.into_any()
        }
    };
    view! {
        <div class="family__section">
            <h3 class="family__section-title">"邀请码"</h3>
            <p class="family__description">"将邀请码分享给家人，他们可以直接加入你的家庭。"</p>
            <div class="family__code-box" id="invite-code-box">{body}</div>
        </div>
    }
}

/// 邀请码校验结果
#[component]
fn VerifyResult(check: CodeCheck) -> impl IntoView {
    match check {
        CodeCheck::Incomplete => ().into_any(),
        CodeCheck::Found(name) => view! {
            <span class="family-modal__verify--ok">{format!("✓ 找到家庭：{name}")}</span>
        }
        .into_any(),
        CodeCheck::Invalid => {
            view! { <span class="family-modal__verify--error">"✗ 邀请码无效"</span> }.into_any()
        }
        CodeCheck::Failed(reason) => view! {
            <span class="family-modal__verify--error">{format!("✗ 验证失败：{reason}")}</span>
        }
        .into_any(),
    }
}

/// 输入邀请码的弹窗；每次输入都会格式化并发起校验，只有找到家庭时才能加入
#[component]
fn JoinModal(
    open: RwSignal<bool>,
    actions: Callback<UiAction>,
    feedback: Feedback,
) -> impl IntoView {
    let code_check = feedback.code_check;
    let (code, set_code) = signal(String::new());

    let verify = move |raw: String| {
        let formatted = format_invite_code(&raw);
        set_code.set(formatted.clone());
        actions.run(UiAction::VerifyInviteCode(formatted));
    };
    let join = move |_| {
        actions.run(UiAction::JoinHome(code.get_untracked()));
        open.set(false);
    };

    view! {
        <div
            class="family-modal__overlay"
            id="join-modal"
            style=move || if open.get() { "display:flex;" } else { "display:none;" }
            on:click=move |_| open.set(false)
        >
            <div class="family-modal" on:click=|ev| ev.stop_propagation()>
                <div class="family-modal__header">
                    <h3 class="family-modal__title">"加入家庭"</h3>
                    <button class="family-modal__close" on:click=move |_| open.set(false)>
                        "×"
                    </button>
                </div>
                <p class="family-modal__desc">"输入邀请码加入其他家庭"</p>
                <input
                    type="text"
                    class=move || feedback.input_class("family-modal__input", INVITE_CODE_FIELD)
                    id=INVITE_CODE_FIELD
                    placeholder="XXXX-XXXX-XXXX-XXXX"
                    maxlength="19"
                    autocomplete="off"
                    spellcheck="false"
                    on:input=move |ev| verify(event_target_value(&ev))
                    prop:value=code
                />
                <div
                    class="family-modal__verify"
                    id="join-verify-result"
                    style=move || {
                        if code_check.get() == CodeCheck::Incomplete { "display:none;" } else { "" }
                    }
                >
                    {move || view! { <VerifyResult check=code_check.get() /> }}
                </div>
                <button
                    class="family__invite-btn"
                    id="join-confirm-btn"
                    disabled=move || !code_check.get().join_ready()
                    on:click=join
                >
                    <span>"加入家庭"</span>
                </button>
            </div>
        </div>
    }
}

#[component]
pub fn FamilyPage(data: FamilyHome, actions: Callback<UiAction>, feedback: Feedback) -> impl IntoView {
    let open = RwSignal::new(false);
    let FamilyHome {
        home,
        members,
        is_owner,
    } = data;
    let name = if home.name.is_empty() {
        "我的家庭".to_string()
    } else {
        home.name
    };
    let count = format!("({})", members.len());
    let rows = if members.is_empty() {
        view! { <p class="family__empty">"暂无成员"</p> }.into_any()
    } else {
        members
            .into_iter()
            .map(|member| view! { <MemberRow member=member /> })
            .collect_view()
            .into_any()
    };
    let open_join = move |_| {
        feedback.code_check.set(CodeCheck::Incomplete);
        open.set(true);
    };

    view! {
        <div class="family">
            <div class="family__header">
                <h2 class="family__title">{name}</h2>
                <p class="family__subtitle">"管理家庭成员，共享物品清单"</p>
            </div>
            <div class="family__section">
                <h3 class="family__section-title">
                    "成员列表 " <span class="family__count">{count}</span>
                </h3>
                <div class="family__members">{rows}</div>
            </div>
            <InviteSection code=home.invite_code is_owner=is_owner actions=actions />
            <div class="family__section">
                <h3 class="family__section-title">"加入其他家庭"</h3>
                <p class="family__description">"如果你收到了邀请码，可以加入另一个家庭。"</p>
                <button class="family__join-btn" id="open-join-btn" on:click=open_join>
                    <span>"输入邀请码"</span>
                </button>
            </div>
        </div>
        <JoinModal open=open actions=actions feedback=feedback />
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::render_html;
    use crate::web::dom::LazyView;
    use chrono::Utc;
    use myhome_shared::Home;

    fn family(is_owner: bool, code: Option<&str>) -> FamilyHome {
        FamilyHome {
            home: Home {
                id: "h1".into(),
                name: "<b>Smith</b>的家".into(),
                owner_id: "u1".into(),
                invite_code: code.map(str::to_string),
                created_at: Utc::now(),
            },
            members: vec![
                Member {
                    user_id: "u1".into(),
                    email: "owner@home.io".into(),
                    role: Role::Owner,
                    joined_at: None,
                },
                Member {
                    user_id: "u2".into(),
                    email: "kid@home.io".into(),
                    role: Role::Member,
                    joined_at: None,
                },
            ],
            is_owner,
        }
    }

    fn render(data: FamilyHome, feedback: Feedback) -> String {
        let actions = Callback::new(|_: UiAction| {});
        render_html(LazyView::new(move || {
            view! { <FamilyPage data=data actions=actions feedback=feedback /> }
        }))
    }

    #[test]
    fn test_members_carry_role_badges() {
        let html = render(family(true, None), Feedback::default());
        assert!(html.contains("创建者"));
        assert!(html.contains("成员</span>"));
        assert!(html.contains("(2)"));
        assert!(html.contains("&lt;b&gt;Smith&lt;/b&gt;的家"));
    }

    #[test]
    fn test_only_owner_can_generate() {
        let generate = r#"id="generate-code-btn""#;
        assert!(render(family(true, None), Feedback::default()).contains(generate));
        assert!(!render(family(false, None), Feedback::default()).contains(generate));

        let shared = render(family(false, Some("ABCD-EFGH-IJKL-MNOP")), Feedback::default());
        assert!(shared.contains("ABCD-EFGH-IJKL-MNOP"));
        assert!(!shared.contains(generate));
    }

    #[test]
    fn test_join_button_follows_code_check() {
        let feedback = Feedback::default();
        let html = render(family(false, None), feedback);
        assert!(html.contains(r#"id="join-verify-result" style="display:none;""#));
        assert!(!html.contains("找到家庭"));

        feedback.code_check.set(CodeCheck::Found("<i>Lee</i>".into()));
        let html = render(family(false, None), feedback);
        assert!(html.contains("✓ 找到家庭：&lt;i&gt;Lee&lt;/i&gt;"));

        feedback.code_check.set(CodeCheck::Invalid);
        let html = render(family(false, None), feedback);
        assert!(html.contains("✗ 邀请码无效"));
    }
}
