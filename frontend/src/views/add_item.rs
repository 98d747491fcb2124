use leptos::html;
use leptos::prelude::*;
use myhome_shared::NewItem;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::app::UiAction;
use crate::feedback::Feedback;
use crate::inventory::{NAME_FIELD, ROOM_FIELD};

pub const CATEGORY_OPTIONS: [&str; 6] = ["家具类", "家电类", "衣帽鞋袜类", "数码电子", "厨房用品", "其他"];

pub const ROOM_OPTIONS: [&str; 10] = [
    "Living Room",
    "Bedroom",
    "Kitchen",
    "Bathroom",
    "Dining Room",
    "Office",
    "Garage",
    "Balcony",
    "Hallway",
    "Other",
];

fn options(values: &'static [&'static str]) -> impl IntoView {
    values
        .iter()
        .map(|v| view! { <option value=*v>{*v}</option> })
        .collect_view()
}

/// 读取文件选择框中的第一个文件，完成后以 data URL 写入 `image`
fn read_image(input: &web_sys::HtmlInputElement, image: RwSignal<Option<String>>) {
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return;
    };
    let Ok(reader) = web_sys::FileReader::new() else {
        log_error!("[AddItem] FileReader unavailable");
        return;
    };

    let loaded = reader.clone();
    let onload = Closure::once_into_js(move || {
        if let Some(data_url) = loaded.result().ok().and_then(|r| r.as_string()) {
            image.set(Some(data_url));
        }
    });
    reader.set_onload(Some(onload.unchecked_ref()));
    if let Err(e) = reader.read_as_data_url(&file) {
        log_error!("[AddItem] Failed to read image: {e:?}");
    }
}

#[component]
fn ImageUpload(image: RwSignal<Option<String>>) -> impl IntoView {
    let file_input = NodeRef::<html::Input>::new();
    let pick = move |_| {
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    view! {
        <div class="image-upload" id="image-upload-area">
            <input
                type="file"
                id="image-input"
                accept="image/*"
                style="display: none;"
                node_ref=file_input
                on:change=move |_| {
                    if let Some(input) = file_input.get() {
                        read_image(&input, image);
                    }
                }
            />
            {move || match image.get() {
                Some(src) => view! {
                    <div class="image-upload__preview" id="image-preview">
                        <img id="preview-image" src=src alt="Preview" />
                        <button
                            type="button"
                            class="image-upload__remove"
                            aria-label="Remove image"
                            on:click=move |_| image.set(None)
                        >
                            "×"
                        </button>
                    </div>
                }
                .into_any(),
                None => view! {
                    <div class="image-upload__placeholder" id="upload-placeholder" on:click=pick>
                        <div class="image-upload__icon">
                            <svg width="56" height="56" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round">
                                <rect x="3" y="3" width="18" height="18" rx="2" ry="2" />
                                <circle cx="8.5" cy="8.5" r="1.5" />
                                <polyline points="21 15 16 10 5 21" />
                            </svg>
                        </div>
                        <button type="button" class="image-upload__button">
                            <span>"上传照片"</span>
                        </button>
                    </div>
                }
                .into_any(),
            }}
        </div>
    }
}

#[component]
pub fn AddItemPage(
    actions: Callback<UiAction>,
    feedback: Feedback,
    /// 已选图片（data URL），默认未选
    #[prop(optional)]
    image: Option<String>,
) -> impl IntoView {
    let image = RwSignal::new(image);
    let (name, set_name) = signal(String::new());
    let (room, set_room) = signal(String::new());
    let (category, set_category) = signal(String::new());
    let (notes, set_notes) = signal(String::new());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let category = category.get_untracked();
        actions.run(UiAction::AddItem(NewItem {
            name: name.get_untracked(),
            room: room.get_untracked(),
            category: (!category.is_empty()).then_some(category),
            notes: notes.get_untracked(),
            image: image.get_untracked().unwrap_or_default(),
        }));
    };

    view! {
        <div class="page-title">"添加物品"</div>
        <ImageUpload image=image />
        <form class="form" id="add-item-form" novalidate on:submit=on_submit>
            <div class="form-group">
                <label class="form-label" for=NAME_FIELD>"名称 *"</label>
                <input
                    class=move || feedback.input_class("form-input", NAME_FIELD)
                    type="text"
                    id=NAME_FIELD
                    placeholder="例如：宜家书架"
                    required
                    maxlength="100"
                    autocomplete="off"
                    on:input=move |ev| set_name.set(event_target_value(&ev))
                    prop:value=name
                />
            </div>
            <div class="form-group">
                <label class="form-label" for=ROOM_FIELD>"房间 *"</label>
                <select
                    class=move || feedback.input_class("form-select", ROOM_FIELD)
                    id=ROOM_FIELD
                    required
                    on:change=move |ev| set_room.set(event_target_value(&ev))
                    prop:value=room
                >
                    <option value="">"选择房间"</option>
                    {options(&ROOM_OPTIONS)}
                </select>
            </div>
            <div class="form-group">
                <label class="form-label" for="item-category">"分类"</label>
                <select
                    class="form-select"
                    id="item-category"
                    on:change=move |ev| set_category.set(event_target_value(&ev))
                    prop:value=category
                >
                    <option value="">"选择分类（可选）"</option>
                    {options(&CATEGORY_OPTIONS)}
                </select>
            </div>
            <div class="form-group">
                <label class="form-label" for="item-notes">"备注"</label>
                <textarea
                    class="form-textarea"
                    id="item-notes"
                    placeholder="颜色、尺寸、购买信息..."
                    rows="3"
                    maxlength="500"
                    on:input=move |ev| set_notes.set(event_target_value(&ev))
                    prop:value=notes
                ></textarea>
            </div>
            <button type="submit" class="btn btn--primary btn--full" id="add-item-submit">
                "保存物品"
            </button>
        </form>
    }
}
