use crate::{
    CrtError, CrtOptions, GlContext,
    vao::{BufferInfo, VertexArrayObject},
};

/// Target sizes below this are treated as this, so there is always at least one tile.
pub const MIN_DIMENSION: u32 = 16;

/// How the vertices of a [`CrtMesh`] are assembled into triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    /// A single quad.
    TriangleFan,

    /// Two triangles per tile.
    Triangles,
}

impl Topology {
    fn gl_mode(self) -> u32 {
        match self {
            Self::TriangleFan => glow::TRIANGLE_FAN,
            Self::Triangles => glow::TRIANGLES,
        }
    }
}

/// The geometry the CRT frame is drawn on, in normalized device coordinates.
///
/// The grid is flat; the vertex shader does the bending.
#[derive(Clone, Debug, PartialEq)]
pub struct CrtMesh {
    pub positions: Vec<[f32; 2]>,
    pub topology: Topology,

    /// Number of tiles along x and y. `[1, 1]` for the flat quad.
    pub tiles: [u32; 2],
}

impl CrtMesh {
    /// The mesh for a target of the given size.
    pub fn new(size: [u32; 2], options: &CrtOptions) -> Self {
        if options.curvature {
            Self::tiled(size, options.tile_size)
        } else {
            Self::quad()
        }
    }

    /// One quad covering the whole viewport.
    pub fn quad() -> Self {
        Self {
            positions: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
            topology: Topology::TriangleFan,
            tiles: [1, 1],
        }
    }

    /// A grid of roughly `tile_size` × `tile_size` pixel tiles covering the whole viewport.
    pub fn tiled(size: [u32; 2], tile_size: u32) -> Self {
        let tiles = Self::tile_counts(size, tile_size);
        let [tiles_x, tiles_y] = tiles;

        // Edges are computed from the tile index so the last one lands exactly on 1.0.
        let edge = |i: u32, n: u32| -1.0 + 2.0 * i as f32 / n as f32;

        let mut positions = Vec::with_capacity(6 * tiles_x as usize * tiles_y as usize);
        for y in 0..tiles_y {
            let (start_y, end_y) = (edge(y, tiles_y), edge(y + 1, tiles_y));
            for x in 0..tiles_x {
                let (start_x, end_x) = (edge(x, tiles_x), edge(x + 1, tiles_x));

                positions.extend_from_slice(&[
                    [start_x, start_y],
                    [end_x, start_y],
                    [end_x, end_y],
                    //
                    [start_x, start_y],
                    [end_x, end_y],
                    [start_x, end_y],
                ]);
            }
        }

        Self {
            positions,
            topology: Topology::Triangles,
            tiles,
        }
    }

    /// Number of tiles along x and y for a target of the given size.
    pub fn tile_counts(size: [u32; 2], tile_size: u32) -> [u32; 2] {
        let tile_size = tile_size.max(1);
        size.map(|dim| (dim.max(MIN_DIMENSION) / tile_size).max(1))
    }

    /// The tile grid a target of `size` would get with these options.
    pub(crate) fn tiles_for(size: [u32; 2], options: &CrtOptions) -> [u32; 2] {
        if options.curvature {
            Self::tile_counts(size, options.tile_size)
        } else {
            [1, 1]
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }
}

// ----------------------------------------------------------------------------

/// A [`CrtMesh`] uploaded to the GPU.
pub(crate) struct GpuMesh<G: GlContext> {
    vbo: G::Buffer,
    vao: VertexArrayObject<G>,
    topology: Topology,
    vertex_count: i32,
    tiles: [u32; 2],
}

impl<G: GlContext> GpuMesh<G> {
    pub(crate) fn new(gl: &G, mesh: &CrtMesh, a_pos: u32) -> Result<Self, CrtError> {
        let vbo = gl.create_buffer().map_err(CrtError::ResourceCreation)?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, mesh.as_bytes(), glow::STATIC_DRAW);

        let buffer_infos = vec![BufferInfo {
            location: a_pos,
            vector_size: 2,
            data_type: glow::FLOAT,
            normalized: false,
            stride: 0,
            offset: 0,
        }];
        let vao = match VertexArrayObject::new(gl, vbo, buffer_infos) {
            Ok(vao) => vao,
            Err(err) => {
                gl.bind_buffer(glow::ARRAY_BUFFER, None);
                gl.delete_buffer(vbo);
                return Err(CrtError::ResourceCreation(err));
            }
        };
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        Ok(Self {
            vbo,
            vao,
            topology: mesh.topology,
            vertex_count: mesh.vertex_count() as i32,
            tiles: mesh.tiles,
        })
    }

    pub(crate) fn tiles(&self) -> [u32; 2] {
        self.tiles
    }

    pub(crate) fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Replace the vertex data, e.g. after the target was resized.
    pub(crate) fn update(&mut self, gl: &G, mesh: &CrtMesh) {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, mesh.as_bytes(), glow::STATIC_DRAW);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        self.topology = mesh.topology;
        self.vertex_count = mesh.vertex_count() as i32;
        self.tiles = mesh.tiles;
    }

    pub(crate) fn draw(&self, gl: &G) {
        self.vao.bind(gl);
        gl.draw_arrays(self.topology.gl_mode(), 0, self.vertex_count);
        self.vao.unbind(gl);
    }

    pub(crate) fn destroy(self, gl: &G) {
        self.vao.destroy(gl);
        gl.delete_buffer(self.vbo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DEFAULT_TILE_SIZE;

    fn in_ndc(mesh: &CrtMesh) -> bool {
        mesh.positions
            .iter()
            .flatten()
            .all(|c| (-1.0..=1.0).contains(c))
    }

    #[test]
    fn flat_quad() {
        let options = CrtOptions {
            curvature: false,
            ..Default::default()
        };
        for size in [[1, 1], [640, 480], [4000, 16]] {
            let mesh = CrtMesh::new(size, &options);
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.topology, Topology::TriangleFan);
            assert!(in_ndc(&mesh));
        }
    }

    #[test]
    fn tiled_vertex_count() {
        let options = CrtOptions::default();
        for [w, h] in [[20, 20], [640, 480], [1920, 1080], [333, 21], [1279, 719]] {
            let mesh = CrtMesh::new([w, h], &options);
            let expected = 6 * (w / DEFAULT_TILE_SIZE) * (h / DEFAULT_TILE_SIZE);
            assert_eq!(mesh.vertex_count(), expected as usize, "{w}x{h}");
            assert_eq!(mesh.topology, Topology::Triangles);
            assert!(in_ndc(&mesh), "{w}x{h}");
        }
    }

    #[test]
    fn tiles_cover_the_whole_viewport() {
        let mesh = CrtMesh::tiled([640, 480], 20);
        let min_x = mesh.positions.iter().map(|p| p[0]).fold(f32::MAX, f32::min);
        let max_x = mesh.positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        let min_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MAX, f32::min);
        let max_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert_eq!([min_x, max_x, min_y, max_y], [-1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn tiny_targets_are_clamped() {
        for size in [[0, 0], [1, 1], [15, 15], [0, 480], [640, 3]] {
            let mesh = CrtMesh::tiled(size, 20);
            let clamped = size.map(|d| d.max(MIN_DIMENSION));
            assert_eq!(mesh, CrtMesh::tiled(clamped, 20), "{size:?}");
            assert!(mesh.vertex_count() >= 6);
            assert!(in_ndc(&mesh));
        }
    }

    #[test]
    fn degenerate_tile_size() {
        assert_eq!(CrtMesh::tile_counts([40, 30], 0), [40, 30]);
        assert_eq!(CrtMesh::tile_counts([16, 16], 20), [1, 1]);
        assert_eq!(CrtMesh::tile_counts([60, 45], 20), [3, 2]);
    }

    #[test]
    fn bytes_are_tightly_packed_floats() {
        let mesh = CrtMesh::quad();
        assert_eq!(mesh.as_bytes().len(), 4 * 2 * std::mem::size_of::<f32>());
    }
}
