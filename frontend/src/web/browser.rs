//! 浏览器胶水层
//!
//! 只在 wasm32 下编译：实现 [`Location`] / [`Document`]。
//! 外壳和页面都用 `leptos::mount::mount_to` 挂载，卸载句柄被丢弃时对应的节点和响应式 owner 一并释放。

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use leptos::mount::mount_to;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

use super::dom::{ChangeListener, Document, LazyView, Location, ViewContainer};
use super::route::ShellKind;

/// 当前挂载的视图的卸载句柄
type MountSlot = Rc<RefCell<Option<Box<dyn Any>>>>;

fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

fn document() -> Option<web_sys::Document> {
    window()?.document()
}

fn element(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

/// 先卸载 `slot` 中的旧视图，再把 `view` 挂到 `target` 下
fn mount_into(slot: &MountSlot, target: Element, view: LazyView) -> bool {
    slot.borrow_mut().take();
    let Ok(target) = target.dyn_into::<HtmlElement>() else {
        return false;
    };
    let handle = mount_to(target, move || view.build());
    *slot.borrow_mut() = Some(Box::new(handle));
    true
}

// ===== Location =====

pub struct BrowserLocation;

impl Location for BrowserLocation {
    fn hash(&self) -> String {
        window()
            .and_then(|w| w.location().hash().ok())
            .unwrap_or_default()
    }

    fn set_hash(&self, path: &str) {
        if let Some(w) = window() {
            let _ = w.location().set_hash(path);
        }
    }

    fn replace_hash(&self, path: &str) {
        if let Some(w) = window() {
            if let Ok(history) = w.history() {
                let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&format!("#{path}")));
            }
        }
    }

    fn on_change(&self, listener: ChangeListener) {
        let closure = Closure::<dyn Fn()>::new(move || spawn_local(listener()));
        if let Some(w) = window() {
            let _ = w.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        }
        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

// ===== Document =====

pub struct BrowserDocument {
    root_id: &'static str,
    shell: MountSlot,
    view: MountSlot,
}

impl BrowserDocument {
    pub fn new(root_id: &'static str) -> Self {
        Self {
            root_id,
            shell: MountSlot::default(),
            view: MountSlot::default(),
        }
    }
}

struct ElementContainer {
    element: Element,
    slot: MountSlot,
}

impl ViewContainer for ElementContainer {
    fn mount(&self, view: LazyView) {
        if !mount_into(&self.slot, self.element.clone(), view) {
            log_error!("[Router] #view is not an HTML element");
        }
    }
}

impl Document for BrowserDocument {
    fn mount_shell(&self, kind: ShellKind, shell: LazyView) {
        // 页面视图位于旧外壳内，先于外壳卸载
        self.view.borrow_mut().take();
        self.shell.borrow_mut().take();

        let Some(root) = element(self.root_id) else {
            log_error!("[Shell] #{} not found", self.root_id);
            return;
        };
        // 根节点下只保留外壳
        root.set_text_content(None);
        if mount_into(&self.shell, root, shell) {
            log_info!("[Shell] Mounted {kind:?} shell");
        } else {
            log_error!("[Shell] #{} is not an HTML element", self.root_id);
        }
    }

    fn view_container(&self) -> Option<Rc<dyn ViewContainer>> {
        let element = element("view")?;
        Some(Rc::new(ElementContainer {
            element,
            slot: Rc::clone(&self.view),
        }))
    }

    fn set_active_nav(&self, path: &str) {
        let Some(items) = document().and_then(|d| d.query_selector_all(".app-nav__item").ok()) else {
            return;
        };
        for i in 0..items.length() {
            let Some(item) = items.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let active = item.get_attribute("data-path").as_deref() == Some(path);
            let _ = item
                .class_list()
                .toggle_with_force("app-nav__item--active", active);
        }
    }
}
