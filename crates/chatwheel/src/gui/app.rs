use crate::config;
use crate::controller::{Controller, Outgoing};
use crate::events::AppEvent;
use crate::gui::dialog;
use crate::gui::menu;
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use crate::sys::hotkey;
use gtk::prelude::*;
use gtk4 as gtk;
use hyprchat::keys::UinputKeyboard;
use hyprchat::wm::{ClientWindow, Hyprland};
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

// Lets the overlay unmap before the game window is focused.
const UNMAP_GRACE: Duration = Duration::from_millis(16);

pub type WheelController = Controller<Hyprland, UinputKeyboard>;

pub struct AppModel {
    pub controller: Rc<RefCell<WheelController>>,
    pub visible: bool,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
    poll: Option<glib::SourceId>,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Cancel,
    Tick,
    Deliver(Outgoing<ClientWindow>),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl AppModel {
    fn start_polling(&mut self, sender: &ComponentSender<Self>) {
        self.stop_polling();
        let interval = self.controller.borrow().config().menu.poll_interval;
        let sender = sender.clone();
        self.poll = Some(glib::timeout_add_local(interval, move || {
            sender.input(AppMsg::Tick);
            glib::ControlFlow::Continue
        }));
    }

    fn stop_polling(&mut self) {
        if let Some(id) = self.poll.take() {
            id.remove();
        }
    }

    fn hide(&mut self) {
        self.stop_polling();
        self.visible = false;
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (WheelController, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Chat Wheel"),
            #[watch]
            set_visible: model.visible,
            add_css_class: "chatwheel-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Cancel);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "chatwheel-drawing-area",
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (controller, rx) = init;

        theme::load_css();
        window::init_layer_shell(&root);

        let model = AppModel {
            controller: Rc::new(RefCell::new(controller)),
            visible: false,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
            poll: None,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let controller_draw = model.controller.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = menu::draw(cr, controller_draw.borrow().state(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => {
                if self.visible {
                    return;
                }
                window::follow_active_monitor(&self.root);
                let cursor = window::cursor_position(&self.root).unwrap_or_default();

                let opened = self.controller.borrow_mut().open(cursor);
                match opened {
                    Ok(()) => {
                        self.visible = true;
                        self.start_polling(&sender);
                        self.drawing_area.queue_draw();
                    }
                    Err(e) => {
                        log::warn!("Not opening: {}", e);
                        dialog::alert("Chat wheel", &e.to_string());
                    }
                }
            }
            AppMsg::Tick => {
                if !self.visible {
                    return;
                }
                let Some(cursor) = window::cursor_position(&self.root) else {
                    return;
                };
                if self.controller.borrow_mut().tick(cursor).should_redraw {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Hide => {
                if !self.visible {
                    return;
                }
                self.hide();
                if let Some(outgoing) = self.controller.borrow_mut().close() {
                    glib::timeout_add_local_once(UNMAP_GRACE, move || {
                        sender.input(AppMsg::Deliver(outgoing));
                    });
                }
            }
            AppMsg::Cancel => {
                self.hide();
                self.controller.borrow_mut().cancel();
            }
            AppMsg::Deliver(outgoing) => {
                if let Err(e) = self.controller.borrow_mut().send(&outgoing) {
                    log::error!("Failed to send '{}': {}", outgoing.message, e);
                }
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.hide();
                    let mut controller = self.controller.borrow_mut();
                    let old_hotkey = controller.config().hotkey.clone();
                    let new_hotkey = new_config.hotkey.clone();

                    if let Err(e) = controller.reload(new_config) {
                        log::error!("Failed to apply config: {}", e);
                        return;
                    }
                    if old_hotkey != new_hotkey {
                        hotkey::unregister(&old_hotkey);
                        if let Err(e) = hotkey::register(&new_hotkey) {
                            log::error!("{}", e);
                        }
                    }
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        self.stop_polling();
        hotkey::unregister(&self.controller.borrow().config().hotkey);
    }
}
