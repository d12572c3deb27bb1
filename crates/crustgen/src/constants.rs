/// Golden ratio, used for the icosahedron corner coordinates
pub const PHI: f32 = 1.618_034;

/// Corners of the icosahedron before normalization
pub const ICOSAHEDRON_CORNERS: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];

/// Faces of the icosahedron as corner triples
pub const ICOSAHEDRON_FACES: [[u8; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

pub const MIN_VERTICES_PER_SIDE: usize = 2;
// keeps vertex count comfortably inside u32 offsets
pub const MAX_VERTICES_PER_SIDE: usize = 8192;

// Crust strengths, expressed as displacement per unit length squared
pub const DEFAULT_COMPRESSIVE_STRENGTH: f32 = 1e-30;
pub const DEFAULT_TENSILE_STRENGTH: f32 = 3e-11;
pub const DEFAULT_SHEAR_STRENGTH: f32 = 3e-10;

pub const DEFAULT_PLATE_COUNT: usize = 8;
pub const DEFAULT_MIN_SEGMENT_VERTEX_COUNT: usize = 10;
