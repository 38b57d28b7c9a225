use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub hovered: Srgba<f64>,
    pub default: Srgba<f64>,
    pub border: Srgba<f64>,
    pub text: Srgba<f64>,
    pub center_circle: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            hovered: Self::lookup_color(
                context,
                "theme_selected_bg_color",
                Srgba::new(0.29, 0.62, 1.0, 0.78),
                Some(0.78),
            ),
            default: Self::lookup_color(
                context,
                "theme_bg_color",
                Srgba::new(0.16, 0.16, 0.16, 0.7),
                Some(0.7),
            ),
            border: Self::lookup_color(
                context,
                "borders",
                Srgba::new(0.39, 0.39, 0.39, 1.0),
                None,
            ),
            text: Self::lookup_color(
                context,
                "theme_selected_fg_color",
                Srgba::new(1.0, 1.0, 1.0, 1.0),
                Some(1.0),
            ),
            center_circle: Self::lookup_color(
                context,
                "theme_base_color",
                Srgba::new(0.08, 0.08, 0.08, 0.78),
                Some(0.78),
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.chatwheel-window, .chatwheel-drawing-area {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
