//! WASM driver for sky-toc
//!
//! Wires [`PostOutline`] to the live post page: headings are scanned from the content container,
//! the outline is rendered into the sidebar and the mobile drawer, and window/document events are
//! forwarded to the component while its effects are carried out on the DOM.
//!
//! ## Usage
//!
//! ```javascript,ignore
//! import init, { mount } from './sky_toc.js';
//!
//! document.addEventListener('DOMContentLoaded', async () => {
//!     await init();
//!     // Optional overrides, same keys as the TOML config
//!     const outline = mount({ header_offset: 80 });
//!     console.log(`outline with ${outline.heading_count} headings`);
//! });
//! ```
//!
//! Every page element is optional. A missing element disables only the feature that needs it;
//! mounting never throws for an incomplete page, only for an invalid config or a missing
//! `window`/`document`.

use std::{cell::RefCell, rc::Rc};

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{
    console, Document, Element, Event, HtmlElement, KeyboardEvent, ScrollBehavior,
    ScrollToOptions, Window,
};

use crate::{
    config::OutlineConfig,
    error::TocError,
    heading::{HeadingLevel, HeadingRecord, HeadingSource, Outline},
    page::{PageEffect, PageElements, PageEvent, PostOutline},
    render::{OutlineTarget, ACTIVE_CLASS, LINK_CLASS},
    tracker::Viewport,
};

const OPEN_CLASS: &str = "open";

/// A heading element of the live article.
struct DomHeading {
    element: Element,
    level: HeadingLevel,
}

impl HeadingSource for DomHeading {
    fn level(&self) -> HeadingLevel {
        self.level
    }

    fn text(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn id(&self) -> Option<String> {
        Some(self.element.id()).filter(|id| !id.is_empty())
    }

    fn set_id(&mut self, id: &str) {
        self.element.set_id(id);
    }
}

/// An outline list on the page, plus the UI that is hidden along with it.
struct DomTarget {
    list: Element,
    hide_with: Option<HtmlElement>,
}

impl DomTarget {
    fn entry(&self, id: &str) -> Option<Element> {
        let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
        self.list
            .query_selector(&format!(r#"[data-target="{escaped}"]"#))
            .ok()
            .flatten()
    }
}

impl OutlineTarget for DomTarget {
    fn replace_entries(&mut self, markup: &str) {
        self.list.set_inner_html(markup);
    }

    fn set_active(&mut self, id: &str, active: bool) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        let classes = entry.class_list();
        let result = if active {
            classes.add_1(ACTIVE_CLASS)
        } else {
            classes.remove_1(ACTIVE_CLASS)
        };
        if let Err(e) = result {
            console::warn_1(&format!("Failed to toggle active marker: {:?}", e).into());
        }
        true
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(container) = &self.hide_with {
            set_displayed(container, visible);
        }
    }
}

struct DomViewport {
    window: Window,
    document: Document,
    content: Option<HtmlElement>,
}

impl Viewport for DomViewport {
    fn scroll_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or_default()
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or_default()
    }

    fn heading_offset(&self, id: &str) -> Option<f64> {
        let element = self.document.get_element_by_id(id)?;
        let element = element.dyn_into::<HtmlElement>().ok()?;
        Some(f64::from(element.offset_top()))
    }

    fn content_bounds(&self) -> Option<(f64, f64)> {
        let content = self.content.as_ref()?;
        Some((
            f64::from(content.offset_top()),
            f64::from(content.offset_height()),
        ))
    }
}

/// Page elements the effects act upon.
struct Widgets {
    sidebar: Option<HtmlElement>,
    toggle: Option<HtmlElement>,
    drawer: Option<Element>,
    overlay: Option<Element>,
    progress: Option<HtmlElement>,
    back_to_top: Option<HtmlElement>,
    body: Option<HtmlElement>,
}

struct Driver {
    component: RefCell<PostOutline<DomTarget>>,
    viewport: DomViewport,
    widgets: Widgets,
}

impl Driver {
    fn now(&self) -> f64 {
        self.viewport
            .window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or_default()
    }

    fn dispatch(self: &Rc<Self>, event: PageEvent) {
        let now = self.now();
        let effects = self
            .component
            .borrow_mut()
            .handle(event, now, &self.viewport);
        self.apply(effects);
    }

    fn apply(self: &Rc<Self>, effects: Vec<PageEffect>) {
        for effect in effects {
            if let Err(e) = self.apply_one(effect) {
                console::error_1(&format!("Outline effect failed: {e}").into());
            }
        }
    }

    fn apply_one(self: &Rc<Self>, effect: PageEffect) -> Result<(), TocError> {
        let window = &self.viewport.window;
        match effect {
            PageEffect::RequestAnimationFrame => {
                let driver = Rc::clone(self);
                let callback = Closure::once_into_js(move || {
                    driver.dispatch(PageEvent::AnimationFrame);
                });
                window
                    .request_animation_frame(callback.unchecked_ref())
                    .map_err(dom_error)?;
            }
            PageEffect::ScrollTo { top } => {
                let options = ScrollToOptions::new();
                options.set_top(top);
                options.set_behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
            }
            PageEffect::Schedule { delay_ms, event } => {
                let driver = Rc::clone(self);
                let callback = Closure::once_into_js(move || {
                    driver.dispatch(event);
                });
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.unchecked_ref(),
                        delay_ms.round() as i32,
                    )
                    .map_err(dom_error)?;
            }
            PageEffect::HideOutline => {
                for element in [&self.widgets.sidebar, &self.widgets.toggle]
                    .into_iter()
                    .flatten()
                {
                    set_displayed(element, false);
                }
            }
            PageEffect::SetDrawerOpen(open) => {
                for element in [&self.widgets.drawer, &self.widgets.overlay]
                    .into_iter()
                    .flatten()
                {
                    let classes = element.class_list();
                    if open {
                        classes.add_1(OPEN_CLASS).map_err(dom_error)?;
                    } else {
                        classes.remove_1(OPEN_CLASS).map_err(dom_error)?;
                    }
                }
            }
            PageEffect::LockBodyScroll(locked) => {
                if let Some(body) = &self.widgets.body {
                    let style = body.style();
                    if locked {
                        style.set_property("overflow", "hidden").map_err(dom_error)?;
                    } else {
                        style.remove_property("overflow").map_err(dom_error)?;
                    }
                }
            }
            PageEffect::SetProgress(percent) => {
                if let Some(progress) = &self.widgets.progress {
                    progress
                        .style()
                        .set_property("width", &format!("{percent}%"))
                        .map_err(dom_error)?;
                }
            }
            PageEffect::SetBackToTopVisible(visible) => {
                if let Some(button) = &self.widgets.back_to_top {
                    let style = button.style();
                    let (opacity, pointer) = if visible { ("1", "auto") } else { ("0", "none") };
                    style.set_property("opacity", opacity).map_err(dom_error)?;
                    style
                        .set_property("pointer-events", pointer)
                        .map_err(dom_error)?;
                }
            }
        }
        Ok(())
    }

    fn listen<F>(self: &Rc<Self>, target: &web_sys::EventTarget, kind: &str, handler: F)
    where
        F: Fn(&Rc<Driver>, Event) + 'static,
    {
        let driver = Rc::clone(self);
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(&driver, event));
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            console::warn_1(&format!("Failed to listen for '{kind}': {:?}", e).into());
        }
        // Listeners live as long as the page.
        closure.forget();
    }
}

fn dom_error(value: JsValue) -> TocError {
    TocError::Dom(format!("{:?}", value))
}

fn set_displayed(element: &HtmlElement, displayed: bool) {
    let style = element.style();
    let result = if displayed {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    };
    if let Err(e) = result {
        console::warn_1(&format!("Failed to change display: {:?}", e).into());
    }
}

fn query(scope: &Document, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

fn query_html(scope: &Document, selector: &str) -> Option<HtmlElement> {
    query(scope, selector).and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

/// The outline link an event originated from, if any.
fn clicked_link(event: &Event, require_link_class: bool) -> Option<String> {
    let element = event.target()?.dyn_into::<Element>().ok()?;
    let is_link = if require_link_class {
        element.class_list().contains(LINK_CLASS)
    } else {
        element.tag_name().eq_ignore_ascii_case("a")
    };
    if !is_link {
        return None;
    }
    event.prevent_default();
    element.get_attribute("data-target")
}

fn scan_headings(document: &Document, config: &OutlineConfig) -> Result<Vec<DomHeading>, TocError> {
    let nodes = document
        .query_selector_all(&config.selectors.headings())
        .map_err(dom_error)?;
    let mut headings = Vec::with_capacity(nodes.length() as usize);
    for index in 0..nodes.length() {
        let Some(element) = nodes.get(index).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        match HeadingLevel::from_tag(&element.tag_name()) {
            Ok(level) => headings.push(DomHeading { element, level }),
            Err(e) => tracing::debug!("Skipping non-heading element: {e}"),
        }
    }
    Ok(headings)
}

fn create_back_to_top(document: &Document, body: Option<&HtmlElement>) -> Option<HtmlElement> {
    let body = body?;
    let button = document
        .create_element("button")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    button.set_class_name("scroll-to-top");
    button.set_inner_text("↑");
    button.set_attribute("aria-label", "Back to top").ok()?;
    let style = button.style();
    style.set_property("opacity", "0").ok()?;
    style.set_property("pointer-events", "none").ok()?;
    body.append_child(&button).ok()?;
    Some(button)
}

/// Handle to a mounted outline.
#[wasm_bindgen]
pub struct OutlineHandle {
    driver: Rc<Driver>,
}

#[wasm_bindgen]
impl OutlineHandle {
    /// Id of the heading currently marked active, if any.
    #[wasm_bindgen(getter)]
    pub fn active(&self) -> Option<String> {
        self.driver.component.borrow().active().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn heading_count(&self) -> usize {
        self.driver
            .component
            .borrow()
            .outline()
            .map(Outline::len)
            .unwrap_or_default()
    }

    /// Scroll to a heading as if its outline entry had been clicked.
    pub fn navigate(&self, id: String) {
        self.driver.dispatch(PageEvent::LinkClicked {
            id,
            in_drawer: false,
        });
    }
}

/// Mount the outline on the current page.
///
/// `config` is an optional object with the same keys as the TOML config; missing keys take
/// their defaults.
#[wasm_bindgen]
pub fn mount(config: JsValue) -> Result<OutlineHandle, JsValue> {
    tracing_wasm::try_set_as_global_default().ok();

    let config: OutlineConfig = if config.is_undefined() || config.is_null() {
        OutlineConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(TocError::from)?
    };
    config.validate()?;

    let window = web_sys::window().ok_or_else(|| TocError::Dom("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| TocError::Dom("no document".to_string()))?;
    let selectors = &config.selectors;

    let sidebar = query_html(&document, &selectors.sidebar);
    let desktop = sidebar
        .as_ref()
        .and_then(|sidebar| sidebar.query_selector(&selectors.list).ok().flatten())
        .map(|list| DomTarget {
            list,
            hide_with: sidebar.clone(),
        });
    let drawer = query(&document, &selectors.drawer);
    let mobile = drawer
        .as_ref()
        .and_then(|drawer| drawer.query_selector(&selectors.list).ok().flatten())
        .map(|list| DomTarget {
            list,
            hide_with: None,
        });
    let toggle = query_html(&document, &selectors.toggle);
    let overlay = query(&document, &selectors.overlay);
    let close = query(&document, &selectors.close);
    let progress = query_html(&document, &selectors.progress);
    let body = document.body();
    let elements = PageElements {
        drawer_controls: toggle.is_some() && drawer.is_some() && overlay.is_some(),
        progress_bar: progress.is_some(),
    };

    let mut headings = scan_headings(&document, &config)?;
    tracing::debug!("Mounting outline over {} heading(s)", headings.len());
    let component = PostOutline::new(config.clone(), &mut headings, desktop, mobile, elements);

    let driver = Rc::new(Driver {
        component: RefCell::new(component),
        viewport: DomViewport {
            content: query_html(&document, &selectors.content),
            window: window.clone(),
            document: document.clone(),
        },
        widgets: Widgets {
            back_to_top: create_back_to_top(&document, body.as_ref()),
            sidebar,
            toggle: toggle.clone(),
            drawer: drawer.clone(),
            overlay: overlay.clone(),
            progress,
            body,
        },
    });

    let has_outline = driver.component.borrow().outline().is_some();
    driver.listen(&window, "scroll", |driver, _: Event| {
        driver.dispatch(PageEvent::Scroll)
    });
    driver.listen(&window, "resize", |driver, _: Event| {
        driver.dispatch(PageEvent::Resize)
    });

    let desktop_list = driver
        .component
        .borrow()
        .desktop()
        .map(|target| target.list.clone());
    if has_outline {
        if let Some(list) = desktop_list {
            driver.listen(&list, "click", |driver, event: Event| {
                if let Some(id) = clicked_link(&event, false) {
                    driver.dispatch(PageEvent::LinkClicked {
                        id,
                        in_drawer: false,
                    });
                }
            });
        }
    }

    if elements.drawer_controls {
        if let (Some(toggle), Some(drawer), Some(overlay)) = (&toggle, &drawer, &overlay) {
            driver.listen(toggle, "click", |driver, _: Event| {
                driver.dispatch(PageEvent::ToggleDrawer)
            });
            if let Some(close) = &close {
                driver.listen(close, "click", |driver, _: Event| {
                    driver.dispatch(PageEvent::CloseDrawer)
                });
            }
            driver.listen(overlay, "click", |driver, _: Event| {
                driver.dispatch(PageEvent::OverlayClicked)
            });
            driver.listen(drawer, "click", |driver, event: Event| {
                if let Some(id) = clicked_link(&event, true) {
                    driver.dispatch(PageEvent::LinkClicked {
                        id,
                        in_drawer: true,
                    });
                }
            });
            driver.listen(&document, "keydown", |driver, event: Event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
                    driver.dispatch(PageEvent::KeyDown(key));
                }
            });
        }
    }

    if let Some(button) = &driver.widgets.back_to_top {
        driver.listen(button, "click", |driver, _: Event| {
            driver.dispatch(PageEvent::BackToTop)
        });
    }

    let now = driver.now();
    let effects = driver.component.borrow_mut().start(now, &driver.viewport);
    driver.apply(effects);

    Ok(OutlineHandle { driver })
}

/// Build the outline forest from plain heading records.
///
/// `headings` is an array of `{ level, text, id? }`. Returns an array of
/// `{ id, text, level, children }` trees, or `null` when there are no headings.
#[wasm_bindgen]
pub fn build_outline(headings: JsValue) -> Result<JsValue, JsValue> {
    let mut headings: Vec<HeadingRecord> =
        serde_wasm_bindgen::from_value(headings).map_err(TocError::from)?;
    match Outline::build(&mut headings) {
        Some(outline) => Ok(serde_wasm_bindgen::to_value(outline.roots()).map_err(TocError::from)?),
        None => Ok(JsValue::NULL),
    }
}

/// Render the outline forest produced by [`build_outline`] as nested list markup.
#[wasm_bindgen]
pub fn render_outline(roots: JsValue) -> Result<String, JsValue> {
    let roots: Vec<crate::heading::HeadingNode> =
        serde_wasm_bindgen::from_value(roots).map_err(TocError::from)?;
    Ok(crate::render::to_markup(&roots))
}
