/// One decoded video frame, as handed from a [`FrameSource`](crate::source::FrameSource)
/// to a [`Detector`](crate::source::Detector).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub dims: (u32, u32),
    // packed pixels, layout agreed between source and detector
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(index: usize, dims: (u32, u32), data: Vec<u8>) -> Self {
        Self { index, dims, data }
    }
}
