use super::model::{State, Wedge};
use super::{BORDER_WIDTH, LABEL_FONT_SIZE};
use crate::config::ChatMessage;
use crate::gui::theme::ThemeColors;
use cairo::Context;
use hyprchat::wm::Point;
use palette::Srgba;
use std::f64::consts::PI;

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

struct WedgeRenderer<'a> {
    message: &'a ChatMessage,
    wedge: Wedge,
    center: Point,
    radius: f64,
    hovered: bool,
}

impl<'a> WedgeRenderer<'a> {
    fn new(message: &'a ChatMessage, index: usize, state: &State) -> Self {
        Self {
            message,
            wedge: Wedge::new(index),
            center: state.center,
            radius: state.radius,
            hovered: state.hover_index == Some(index),
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_wedge(cr, colors)?;
        self.draw_label(cr, colors)
    }

    fn draw_wedge(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        cr.new_path();
        cr.move_to(self.center.x, self.center.y);
        cr.arc(
            self.center.x,
            self.center.y,
            self.radius,
            self.wedge.start,
            self.wedge.end,
        );
        cr.close_path();

        set_color(cr, if self.hovered { colors.hovered } else { colors.default });
        cr.fill_preserve()?;

        set_color(cr, colors.border);
        cr.set_line_width(BORDER_WIDTH);
        cr.stroke()
    }

    fn draw_label(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let pos = self.wedge.label_position(self.center, self.radius);
        set_color(cr, colors.text);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(LABEL_FONT_SIZE);
        let ext = cr.text_extents(self.message)?;
        cr.move_to(
            pos.x - ext.width() / 2.0 - ext.x_bearing(),
            pos.y - ext.height() / 2.0 - ext.y_bearing(),
        );
        cr.show_text(self.message)
    }
}

/// Paints the wheel; a no-op while hidden.
pub fn draw(cr: &Context, state: &State, colors: &ThemeColors) -> Result<(), cairo::Error> {
    if !state.visible {
        return Ok(());
    }

    for (i, message) in state.menu.iter().enumerate() {
        WedgeRenderer::new(message, i, state).draw(cr, colors)?;
    }
    draw_center_circle(cr, state, colors)
}

fn draw_center_circle(
    cr: &Context,
    state: &State,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.center_circle);
    cr.new_path();
    cr.arc(state.center.x, state.center.y, state.dead_zone, 0.0, 2.0 * PI);
    cr.fill()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::menu::{Menu, SLOT_COUNT, slice_at};
    use cairo::{Format, ImageSurface};

    const SIZE: i32 = 400;
    const CENTER: Point = Point { x: 200.0, y: 200.0 };
    const HOVERED: u32 = 0xffff0000;
    const DEFAULT: u32 = 0xff0000ff;

    fn colors() -> ThemeColors {
        ThemeColors {
            hovered: Srgba::new(1.0, 0.0, 0.0, 1.0),
            default: Srgba::new(0.0, 0.0, 1.0, 1.0),
            border: Srgba::new(0.0, 1.0, 0.0, 1.0),
            text: Srgba::new(0.0, 0.0, 0.0, 0.0),
            center_circle: Srgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    fn state() -> State {
        let menu = Menu::new(std::array::from_fn(|i| ChatMessage::new(format!("msg {i}"))));
        State::new(menu, 150.0, 30.0)
    }

    fn render(state: &State) -> ImageSurface {
        let surface = ImageSurface::create(Format::ARgb32, SIZE, SIZE).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, state, &colors()).unwrap();
        }
        surface.flush();
        surface
    }

    fn pixel(surface: &mut ImageSurface, p: Point) -> u32 {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = p.y as usize * stride + p.x as usize * 4;
        u32::from_ne_bytes(data[offset..offset + 4].try_into().unwrap())
    }

    // Well inside the wedge, past the label ring.
    fn inside(index: usize) -> Point {
        let angle = Wedge::new(index).mid();
        Point::new(CENTER.x + 120.0 * angle.cos(), CENTER.y + 120.0 * angle.sin())
    }

    #[test]
    fn test_hidden_draws_nothing() {
        let mut state = state();
        state.open(CENTER);
        state.hover_index = Some(2);
        state.close();

        let mut surface = render(&state);
        assert!(surface.data().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_only_hovered_wedge_is_highlighted() {
        let mut state = state();
        state.open(CENTER);
        state.update_cursor(inside(2));
        assert_eq!(state.hover_index, Some(2));

        let mut surface = render(&state);
        for i in 0..SLOT_COUNT {
            let p = inside(i);
            assert_eq!(slice_at(CENTER, p, SLOT_COUNT, 30.0, 150.0), Some(i));
            let expected = if i == 2 { HOVERED } else { DEFAULT };
            assert_eq!(pixel(&mut surface, p), expected, "wedge {i}");
        }
        assert_eq!(pixel(&mut surface, CENTER), 0xffffffff);
        assert_eq!(pixel(&mut surface, Point::new(5.0, 5.0)), 0);
    }
}
