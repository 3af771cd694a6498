use std::thread;

use num_traits::AsPrimitive;

use crate::constants::CONTEXT_SIZE;
use crate::error::{Error, Result};
use crate::golombcoder::golomb::Coder as GolombCoder;
use crate::golombcoder::golomb::State;
use crate::jpeg2000rct::RCT;
use crate::pred::{derive_borders, get_context, get_median};
use crate::rangecoder::tables::default_state_transition;
use crate::rangecoder::RangeCoder;
use crate::record::ConfigRecord;
use crate::slice::{count_slices, is_keyframe, InternalFrame, Slice, SliceHeader, SliceInfo, SlicePlane};

#[allow(clippy::large_enum_variant)]
enum Coder<'a> {
    Golomb(GolombCoder<'a>),
    Range(RangeCoder<'a>),
}

/// Frame contains a decoded FFV1 frame and relevant data about the frame.
///
/// If bit_depth is 8, image data is in `buf`. Otherwise it is in `buf16`.
///
/// Image data consists of up to four contiguous planes, as follows:
///   - If colorspace is YCbCr:
///     - Plane 0 is Luma (always present)
///     - If has_chroma is true, the next two planes are Cb and Cr,
///       subsampled by chroma_subsample_v and chroma_subsample_h.
///     - If has_alpha is true, the next plane is alpha.
///   - If colorspace is RGB:
///     - Plane 0 is Green
///     - Plane 1 is Blue
///     - Plane 2 is Red
///     - If has_alpha is true, plane 3 is alpha.
pub struct Frame {
    /// Image data. Valid only when bit_depth is 8.
    pub buf: Vec<Vec<u8>>,
    /// Image data. Valid only when bit_depth is greater than 8.
    pub buf16: Vec<Vec<u16>>,
    /// Width of the frame, in pixels.
    pub width: u32,
    /// Height of the frame, in pixels.
    pub height: u32,
    /// Bitdepth of the frame (8-16).
    pub bit_depth: u8,
    /// Colorspace of the frame. See the colorspace constants.
    pub color_space: isize,
    /// Whether or not chroma planes are present.
    pub has_chroma: bool,
    /// Whether or not an alpha plane is present.
    pub has_alpha: bool,
    /// The log2 vertical chroma subsampling value.
    pub chroma_subsample_v: u8,
    /// The log2 horizontal chroma subsampling value.
    pub chroma_subsample_h: u8,
}

/// Per-slice scratch pixel storage, local to a single slice's decode
/// pass. Every plane here is addressed with `stride == width` and
/// `offset == 0`: slices are fully independent (9.1.1), so decoding
/// writes into an owned buffer instead of the shared `Frame`, and a
/// later serial "blit" pass copies the finished rectangle into place.
/// This is what lets slices decode on separate threads without any
/// `unsafe` aliasing of the frame buffer.
#[derive(Default)]
struct SliceScratch {
    buf8: Vec<Vec<u8>>,
    buf16: Vec<Vec<u16>>,
    buf32: Vec<Vec<u32>>,
}

/// Decoder is an FFV1 decoder instance.
pub struct Decoder {
    record: ConfigRecord,
    state_transition: [u8; 256],
    current_frame: InternalFrame,
}

impl Decoder {
    /// Creates a new FFV1 decoder instance.
    ///
    /// `record` is the codec private data provided by the container. For
    /// Matroska, this is what is in `CodecPrivate` (adjusted for e.g. VFW
    /// data that may be before it). For ISOBMFF, this is the `glbl` box.
    ///
    /// `width` and `height` are the frame width and height provided by
    /// the container.
    pub fn new(record: &[u8], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "invalid dimensions: {}x{}",
                width, height
            )));
        }

        if record.is_empty() {
            return Err(Error::InvalidArgument(
                "invalid configuration record with length zero".to_owned(),
            ));
        }

        let record = ConfigRecord::parse_config_record(record, width, height)?;

        let mut decoder = Decoder {
            record,
            state_transition: [0; 256],
            current_frame: InternalFrame {
                keyframe: false,
                slice_info: Vec::new(),
                slices: Vec::new(),
            },
        };

        decoder.initialize_states();

        Ok(decoder)
    }

    /// Takes a packet and decodes it to a `Frame`.
    ///
    /// Each slice decodes on its own thread via `std::thread::scope`; the
    /// results are then blitted into the output frame serially.
    pub fn decode_frame(&mut self, frame_input: &[u8]) -> Result<Frame> {
        let mut frame = self.alloc_frame();

        // We parse the frame's keyframe info outside the slice decoding
        // loop so we know ahead of time if each slice has to refresh its
        // states or not. This allows easy slice threading.
        self.current_frame.keyframe = is_keyframe(frame_input);

        // We parse all the footers ahead of time too, for the same
        // reason: it lets us know all the slice positions and sizes, and
        // validate them, before any decoding starts.
        //
        // See: 9.1.1. Multi-threading Support and Independence of Slices
        self.parse_footers(frame_input)?;

        let record = &self.record;
        let state_transition = &self.state_transition;
        let keyframe = self.current_frame.keyframe;
        let slice_info = self.current_frame.slice_info.clone();
        let slices = std::mem::take(&mut self.current_frame.slices);

        let results: Vec<Result<(Slice, SliceScratch)>> = thread::scope(|scope| {
            let handles: Vec<_> = slices
                .into_iter()
                .zip(slice_info.iter())
                .map(|(slice, &info)| {
                    scope.spawn(move || {
                        Self::decode_slice(frame_input, info, slice, record, state_transition, keyframe)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(Error::InvalidBitstream("slice decode thread panicked".to_owned())))
                })
                .collect()
        });

        let mut rebuilt_slices = Vec::with_capacity(results.len());
        for (i, result) in results.into_iter().enumerate() {
            let (slice, scratch) = result.map_err(|err| {
                Error::InvalidBitstream(format!("slice {} failed: {}", i, err))
            })?;
            Self::blit_slice(&slice, &scratch, &self.record, &mut frame);
            rebuilt_slices.push(slice);
        }
        self.current_frame.slices = rebuilt_slices;

        Ok(frame)
    }

    /// Allocates the output `Frame` for the configured dimensions, bit
    /// depth and colorspace.
    fn alloc_frame(&self) -> Frame {
        let record = &self.record;
        let mut frame = Frame {
            buf: Vec::new(),
            buf16: Vec::new(),
            width: record.width,
            height: record.height,
            bit_depth: record.bits_per_raw_sample,
            color_space: record.colorspace_type as isize,
            has_chroma: record.chroma_planes,
            has_alpha: record.extra_plane,
            chroma_subsample_v: if record.chroma_planes {
                record.log2_v_chroma_subsample
            } else {
                0
            },
            chroma_subsample_h: if record.chroma_planes {
                record.log2_h_chroma_subsample
            } else {
                0
            },
        };

        let mut num_planes = 1;
        if record.chroma_planes {
            num_planes += 2;
        }
        if record.extra_plane {
            num_planes += 1;
        }

        let full_size = (record.width * record.height) as usize;
        let chroma_width = record.width >> record.log2_h_chroma_subsample;
        let chroma_height = record.height >> record.log2_v_chroma_subsample;
        let chroma_size = (chroma_width * chroma_height) as usize;

        if record.bits_per_raw_sample == 8 {
            frame.buf = vec![Vec::new(); num_planes];
            frame.buf[0] = vec![0; full_size];
            if record.chroma_planes {
                frame.buf[1] = vec![0; chroma_size];
                frame.buf[2] = vec![0; chroma_size];
            }
            if record.extra_plane {
                frame.buf[num_planes - 1] = vec![0; full_size];
            }
        }

        if record.bits_per_raw_sample > 8 || record.colorspace_type == 1 {
            frame.buf16 = vec![Vec::new(); num_planes];
            frame.buf16[0] = vec![0; full_size];
            if record.chroma_planes {
                frame.buf16[1] = vec![0; chroma_size];
                frame.buf16[2] = vec![0; chroma_size];
            }
            if record.extra_plane {
                frame.buf16[num_planes - 1] = vec![0; full_size];
            }
        }

        // When we decoded 8-bit RGB we only needed buf16 as scratch for
        // the RCT step; the caller only ever wants buf.
        if record.bits_per_raw_sample == 8 && record.colorspace_type == 1 {
            frame.buf16 = Vec::new();
        }

        frame
    }

    /// Initializes initial state for the range coder.
    ///
    /// See: 4.1.15. initial_state_delta
    fn initialize_states(&mut self) {
        for (i, default) in default_state_transition().iter().enumerate().skip(1) {
            self.state_transition[i] =
                (*default as i16 + self.record.state_transition_delta[i]) as u8;
        }
    }

    /// Parses all footers in a frame and allocates any necessary slice
    /// structures.
    ///
    /// See: * 9.1.1. Multi-threading Support and Independence of Slices
    ///      * 3.8.1.3. Initial Values for the Context Model
    ///      * 3.8.2.4. Initial Values for the VLC context state
    fn parse_footers(&mut self, buf: &[u8]) -> Result<()> {
        let slice_info = count_slices(buf, self.record.ec != 0)?;
        self.current_frame.slice_info = slice_info;

        let mut slices: Vec<Slice> = vec![Default::default(); self.current_frame.slice_info.len()];

        if !self.current_frame.keyframe {
            if slices.len() != self.current_frame.slices.len() {
                return Err(Error::InvalidBitstream(
                    "inter frames must have the same number of slices as the preceding intra frame"
                        .to_owned(),
                ));
            }
            for (next, current) in slices.iter_mut().zip(self.current_frame.slices.iter()) {
                next.state = current.state.clone();
                if self.record.coder_type == 0 {
                    next.golomb_state = current.golomb_state.clone();
                }
            }
        }

        self.current_frame.slices = slices;

        Ok(())
    }

    /// Parses a slice's header and derives its local (scratch-buffer)
    /// plane geometry plus its blit target within the frame.
    ///
    /// See: 4.5. Slice Header
    fn parse_slice_header(
        current_slice: &mut Slice,
        record: &ConfigRecord,
        coder: &mut RangeCoder,
    ) -> Result<()> {
        // 4. Bitstream
        let mut slice_state: [u8; CONTEXT_SIZE] = [128; CONTEXT_SIZE];

        // 4.5.1. slice_x
        current_slice.header.slice_x = coder.ur(&mut slice_state)?;
        // 4.5.2. slice_y
        current_slice.header.slice_y = coder.ur(&mut slice_state)?;
        // 4.5.3. slice_width
        current_slice.header.slice_width_minus1 = coder.ur(&mut slice_state)?;
        // 4.5.4. slice_height
        current_slice.header.slice_height_minus1 = coder.ur(&mut slice_state)?;

        // 4.5.5. quant_table_set_index_count
        let mut quant_table_set_index_count = 1;
        if record.chroma_planes {
            quant_table_set_index_count += 1;
        }
        if record.extra_plane {
            quant_table_set_index_count += 1;
        }

        // 4.5.6. quant_table_set_index
        current_slice.header.quant_table_set_index = vec![0; quant_table_set_index_count];
        for i in 0..quant_table_set_index_count {
            current_slice.header.quant_table_set_index[i] = coder.ur(&mut slice_state)? as u8;
        }

        // 4.5.7. picture_structure
        current_slice.header.picture_structure = coder.ur(&mut slice_state)? as u8;

        // See: * 4.5.8. sar_num
        //      * 4.5.9. sar_den
        current_slice.header.sar_num = coder.ur(&mut slice_state)?;
        current_slice.header.sar_den = coder.ur(&mut slice_state)?;

        // Calculate boundaries for easy use elsewhere.
        //
        // See: * 4.6.3. slice_pixel_height
        //      * 4.6.4. slice_pixel_y
        //      * 4.7.2. slice_pixel_width
        //      * 4.7.3. slice_pixel_x
        let start_x = current_slice.header.slice_x * record.width / (record.num_h_slices_minus1 as u32 + 1);
        let start_y =
            current_slice.header.slice_y * record.height / (record.num_v_slices_minus1 as u32 + 1);
        let width = ((current_slice.header.slice_x + current_slice.header.slice_width_minus1 + 1)
            * record.width
            / (record.num_h_slices_minus1 as u32 + 1))
            - start_x;
        let height = ((current_slice.header.slice_y + current_slice.header.slice_height_minus1 + 1)
            * record.height
            / (record.num_v_slices_minus1 as u32 + 1))
            - start_y;

        // Local scratch addressing: stride equals the plane's own width
        // and the slice always starts at offset zero in its own buffer.
        // `start_x`/`start_y` record where this rectangle belongs once
        // it's blitted back into the shared frame.
        let full_plane = SlicePlane {
            start_x,
            start_y,
            width,
            height,
            stride: width,
            quant: 0,
        };

        // Decode order is luma, then chroma (if present), then alpha
        // last -- matching the plane order Frame exposes to callers.
        //
        // See: * 4.7.2. plane_pixel_height
        //      * 4.8.1. plane_pixel_width
        current_slice.planes.push(full_plane.clone());

        if record.chroma_planes {
            let start_x = (start_x as f64 / ((1 << record.log2_v_chroma_subsample) as f64)).ceil() as u32;
            let start_y = (start_y as f64 / ((1 << record.log2_h_chroma_subsample) as f64)).ceil() as u32;
            let width = (width as f64 / (1 << record.log2_h_chroma_subsample) as f64).ceil() as u32;
            let height = (height as f64 / (1 << record.log2_v_chroma_subsample) as f64).ceil() as u32;
            let chroma_plane = SlicePlane {
                start_x,
                start_y,
                width,
                height,
                stride: width,
                quant: 1,
            };

            current_slice.planes.push(chroma_plane.clone());
            current_slice.planes.push(chroma_plane);
        }

        if record.extra_plane {
            let alpha_plane = SlicePlane {
                quant: if record.chroma_planes { 2 } else { 1 },
                ..full_plane
            };
            current_slice.planes.push(alpha_plane);
        }

        Ok(())
    }

    /// Line decoding.
    ///
    /// Separate from the per-plane loop because RGB mode decodes every
    /// line across all planes in one interleaved pass instead of
    /// finishing one plane at a time.
    ///
    /// See: 4.7. Line
    #[allow(clippy::too_many_arguments)]
    fn decode_line<T>(
        header: &SliceHeader,
        record: &ConfigRecord,
        coder: &mut Coder,
        state: &mut [Vec<Vec<u8>>],
        golomb_state: &mut [Vec<State>],
        buf: &mut [T],
        width: usize,
        height: usize,
        stride: usize,
        yy: usize,
        qt: usize,
    ) -> Result<()>
    where
        T: AsPrimitive<usize> + AsPrimitive<isize>,
        u32: AsPrimitive<T>,
    {
        // Runs are horizontal and thus cannot run more than a line.
        //
        // See: 3.8.2.2.1. Run Length Coding
        if let Coder::Golomb(ref mut golomb_coder) = coder {
            golomb_coder.new_line();
        }

        // 3.8. Coding of the Sample Difference
        let shift = if record.colorspace_type == 1 {
            record.bits_per_raw_sample + 1
        } else {
            record.bits_per_raw_sample
        };

        let quant_table = &record.quant_tables[header.quant_table_set_index[qt] as usize];

        // 4.7.4. sample_difference
        for x in 0..width {
            // Derive neighbours.
            //
            // See: * 3.4. Context
            //      * 3.6. Quantization Table Set Indexes
            #[allow(non_snake_case)]
            #[allow(clippy::many_single_char_names)]
            let (top2, left2, t, l, tr, tl) = derive_borders(buf, x, yy, width, height, stride);

            let mut context = get_context(quant_table, top2, left2, t, l, tr, tl);
            let sign = if context < 0 {
                context = -context;
                true
            } else {
                false
            };

            let mut diff = match coder {
                Coder::Golomb(ref mut golomb_coder) => golomb_coder.sg(
                    context,
                    &mut golomb_state[qt][context as usize],
                    shift as usize,
                ),
                Coder::Range(ref mut range_coder) => {
                    range_coder.sr(&mut state[qt][context as usize])?
                }
            };

            // 3.4. Context
            if sign {
                diff = -diff;
            }

            // 3.8. Coding of the Sample Difference
            let mut val: i32 = diff;
            if record.colorspace_type == 0
                && record.bits_per_raw_sample == 16
                && matches!(coder, Coder::Golomb(_))
            {
                // 3.3. Median Predictor
                let left16s = if l >= 32768 { l - 65536 } else { l };
                let top16s = if t >= 32768 { t - 65536 } else { t };
                let diag16s = if tl >= 32768 { tl - 65536 } else { tl };

                val += get_median(left16s, top16s, left16s + top16s - diag16s) as i32;
            } else {
                val += get_median(l, t, l + t - tl) as i32;
            }

            val &= (1 << shift) - 1;

            let val1 = val as u32;
            buf[(yy * stride) + x] = val1.as_();
        }

        Ok(())
    }

    /// YCbCr Mode
    ///
    /// Planes are independent.
    ///
    /// See: 3.7.1. YCbCr
    fn decode_slice_content_yuv<T>(
        current_slice: &mut Slice,
        record: &ConfigRecord,
        coder: &mut Coder,
        buf: &mut [Vec<T>],
    ) -> Result<()>
    where
        T: AsPrimitive<usize> + AsPrimitive<isize>,
        u32: AsPrimitive<T>,
    {
        let planes = &current_slice.planes;
        let header = &current_slice.header;
        let state = &mut current_slice.state;
        let golomb_state = &mut current_slice.golomb_state;

        for (plane, buf) in planes.iter().zip(buf.iter_mut()) {
            // 3.8.2.2.1. Run Length Coding
            if let Coder::Golomb(ref mut golomb_coder) = coder {
                golomb_coder.new_plane(plane.width);
            }

            for y in 0..plane.height as usize {
                Self::decode_line(
                    header,
                    record,
                    coder,
                    state,
                    golomb_state,
                    buf,
                    plane.width as usize,
                    plane.height as usize,
                    plane.stride as usize,
                    y,
                    plane.quant.into(),
                )?;
            }
        }

        Ok(())
    }

    /// RGB (JPEG2000-RCT) Mode
    ///
    /// All planes are coded per line.
    ///
    /// See: 3.7.2. RGB
    fn decode_slice_content_rct<T>(
        current_slice: &mut Slice,
        record: &ConfigRecord,
        coder: &mut Coder,
        buf: &mut [Vec<T>],
    ) -> Result<()>
    where
        T: AsPrimitive<usize> + AsPrimitive<isize>,
        u32: AsPrimitive<T>,
    {
        let planes = &current_slice.planes;
        // All planes share the same dimensions; only the quantizer
        // index changes.
        let stride = planes[0].stride as usize;
        let width = planes[0].width as usize;
        let height = planes[0].height as usize;

        let header = &current_slice.header;
        let state = &mut current_slice.state;
        let golomb_state = &mut current_slice.golomb_state;

        if let Coder::Golomb(ref mut golomb_coder) = coder {
            golomb_coder.new_plane(width as u32);
        }

        for y in 0..height {
            for (plane, buf) in planes.iter().zip(buf.iter_mut()) {
                Self::decode_line(
                    header,
                    record,
                    coder,
                    state,
                    golomb_state,
                    buf,
                    width,
                    height,
                    stride,
                    y,
                    plane.quant.into(),
                )?;
            }
        }

        Ok(())
    }

    /// Decoding happens here.
    ///
    /// See: 4.6. Slice Content
    fn decode_slice_content(
        current_slice: &mut Slice,
        record: &ConfigRecord,
        coder: &mut Coder,
        scratch: &mut SliceScratch,
    ) -> Result<()> {
        let num_planes = current_slice.planes.len();

        if record.colorspace_type != 1 {
            if record.bits_per_raw_sample == 8 {
                scratch.buf8 = current_slice
                    .planes
                    .iter()
                    .map(|p| vec![0u8; (p.width * p.height) as usize])
                    .collect();
                Self::decode_slice_content_yuv(current_slice, record, coder, &mut scratch.buf8)?;
            } else {
                scratch.buf16 = current_slice
                    .planes
                    .iter()
                    .map(|p| vec![0u16; (p.width * p.height) as usize])
                    .collect();
                Self::decode_slice_content_yuv(current_slice, record, coder, &mut scratch.buf16)?;
            }
            return Ok(());
        }

        let width = current_slice.planes[0].width as usize;
        let height = current_slice.planes[0].height as usize;
        let plane_px = width * height;

        if record.bits_per_raw_sample == 8 {
            scratch.buf16 = vec![vec![0u16; plane_px]; num_planes];
            Self::decode_slice_content_rct(current_slice, record, coder, &mut scratch.buf16)?;
            scratch.buf8 = vec![vec![0u8; plane_px]; num_planes];
            RCT::rct(
                &mut scratch.buf8,
                &scratch.buf16,
                width,
                height,
                width,
                0,
                record.bits_per_raw_sample.into(),
            );
        } else if (9..=15).contains(&record.bits_per_raw_sample) && !record.extra_plane {
            scratch.buf16 = vec![vec![0u16; plane_px]; num_planes];
            Self::decode_slice_content_rct(current_slice, record, coder, &mut scratch.buf16)?;
            let src: Vec<Vec<u8>> = Vec::new();
            // See: 3.7.2. RGB -- in-place transform, dst doubles as src.
            RCT::rct(
                &mut scratch.buf16,
                &src,
                width,
                height,
                width,
                0,
                record.bits_per_raw_sample.into(),
            );
        } else {
            scratch.buf32 = vec![vec![0u32; plane_px]; num_planes];
            Self::decode_slice_content_rct(current_slice, record, coder, &mut scratch.buf32)?;
            scratch.buf16 = vec![vec![0u16; plane_px]; num_planes];
            RCT::rct(
                &mut scratch.buf16,
                &scratch.buf32,
                width,
                height,
                width,
                0,
                record.bits_per_raw_sample.into(),
            );
        }

        Ok(())
    }

    /// Resets the range coder and Golomb-Rice coder states.
    ///
    /// See: * 3.8.1.3. Initial Values for the Context Model
    ///      * 3.8.2.4. Initial Values for the VLC context state
    fn reset_slice_states(current_slice: &mut Slice, record: &ConfigRecord) {
        current_slice.state = record.initial_states.clone();

        if record.coder_type == 0 {
            let count = record.quant_table_set_count;
            current_slice.golomb_state = record.context_count[..count]
                .iter()
                .map(|&len| vec![State::default(); len as usize])
                .collect();
        }
    }

    /// Decodes a single slice against its own owned state, independent
    /// of every other slice. Safe to run on any thread: it touches no
    /// shared mutable state, only its own `Slice` and a freshly
    /// allocated scratch buffer.
    fn decode_slice(
        buf: &[u8],
        slice_info: SliceInfo,
        mut current_slice: Slice,
        record: &ConfigRecord,
        state_transition: &[u8; 256],
        keyframe: bool,
    ) -> Result<(Slice, SliceScratch)> {
        // If this is a keyframe, refresh states.
        if keyframe {
            Self::reset_slice_states(&mut current_slice, record);
        }

        let mut coder = RangeCoder::new(&buf[slice_info.pos..]);

        // 4. Bitstream
        let mut state: [u8; CONTEXT_SIZE] = [128; CONTEXT_SIZE];

        // Skip keyframe bit on slice 0.
        if slice_info.pos == 0 {
            coder.br(&mut state);
        }

        if record.coder_type == 2 {
            // Custom state transition table.
            coder.set_table(state_transition);
        }

        Self::parse_slice_header(&mut current_slice, record, &mut coder)?;

        let mut coder = if record.coder_type == 0 {
            // We're switching to Golomb-Rice mode now so we need the
            // bitstream position.
            //
            // See: 3.8.1.1.1. Termination
            coder.sentinel_end();
            let offset = coder.get_pos() - 1;
            let start = (slice_info.pos as isize + offset) as usize;
            Coder::Golomb(GolombCoder::new(&buf[start..]))
        } else {
            Coder::Range(coder)
        };

        let mut scratch = SliceScratch::default();
        Self::decode_slice_content(&mut current_slice, record, &mut coder, &mut scratch)?;

        Ok((current_slice, scratch))
    }

    /// Copies a decoded slice's scratch planes into their destination
    /// rectangle within the shared frame. This is the only part of
    /// slice decoding that touches the frame buffer, and it always runs
    /// serially after every slice has finished decoding.
    fn blit_slice(current_slice: &Slice, scratch: &SliceScratch, record: &ConfigRecord, frame: &mut Frame) {
        let frame_stride = |plane_index: usize| -> usize {
            if record.chroma_planes && (plane_index == 1 || plane_index == 2) {
                (record.width >> record.log2_h_chroma_subsample) as usize
            } else {
                record.width as usize
            }
        };

        let use_buf8 = record.bits_per_raw_sample == 8;

        for (i, plane) in current_slice.planes.iter().enumerate() {
            let stride = frame_stride(i);
            let width = plane.width as usize;
            let height = plane.height as usize;
            let start_x = plane.start_x as usize;
            let start_y = plane.start_y as usize;

            if use_buf8 {
                let src = &scratch.buf8[i];
                let dst = &mut frame.buf[i];
                for y in 0..height {
                    let src_row = &src[y * width..(y + 1) * width];
                    let dst_start = (start_y + y) * stride + start_x;
                    dst[dst_start..dst_start + width].copy_from_slice(src_row);
                }
            } else {
                let src = &scratch.buf16[i];
                let dst = &mut frame.buf16[i];
                for y in 0..height {
                    let src_row = &src[y * width..(y + 1) * width];
                    let dst_start = (start_y + y) * stride + start_x;
                    dst[dst_start..dst_start + width].copy_from_slice(src_row);
                }
            }
        }
    }
}
