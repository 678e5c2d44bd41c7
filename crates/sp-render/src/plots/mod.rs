pub mod shape;

mod axes_draw;
