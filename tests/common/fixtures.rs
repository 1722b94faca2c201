use std::io::Cursor;

use dragon_flight::resources::obj::{ObjError, ObjModel, load_obj_buf_async};
use futures::executor::block_on;

/// A two-material wing: one textured quad split into triangles plus a bare tip.
pub const WING_OBJ: &str = "\
# wing
mtllib wing.mtl
o Wing
v 0 0 0
v 2 0 0
v 2 0 2
v 0 0 2
v 1 1 3
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
usemtl Scale
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
usemtl Claw
f 3 4 5
";

pub const WING_MTL: &str = "\
newmtl Scale
Ns 96.078431
Ka 0.1 0.1 0.1
Kd 0.2 0.6 0.1
Ks 0.5 0.5 0.5
d 1.0
illum 2
map_Kd scales.png
newmtl Claw
Kd 0.9
d 0.5
";

pub fn parse_wing(obj: &str) -> Result<ObjModel, ObjError> {
    block_on(load_obj_buf_async(Cursor::new(obj), |name| async move {
        match name.as_str() {
            "wing.mtl" => Ok(WING_MTL.to_string()),
            _ => anyhow::bail!("{name} not found"),
        }
    }))
}

/// A `size`×`size` heightmap image whose red channel rises along x.
pub fn ramp_image(size: u32) -> image::DynamicImage {
    let img = image::RgbaImage::from_fn(size, size, |x, _| {
        let red = (x * 255 / (size - 1)) as u8;
        image::Rgba([red, 0, 0, 255])
    });
    image::DynamicImage::ImageRgba8(img)
}
